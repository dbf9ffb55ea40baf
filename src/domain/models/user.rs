use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{error::DomainError, models::credential::HashedPassword};

/// Identifier assigned by persistence when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::PreferNotToSay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
            Gender::PreferNotToSay => "PREFER_NOT_TO_SAY",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the variant name in any letter case, e.g. `female` or `PREFER_NOT_TO_SAY`.
impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidGender(s.to_string()))
    }
}

/// How an account proves its identity. Only `Local` accounts carry a
/// password hash; the others are verified by the named identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthProvider {
    Local,
    Google,
    Github,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 3] = [
        AuthProvider::Local,
        AuthProvider::Google,
        AuthProvider::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "LOCAL",
            AuthProvider::Google => "GOOGLE",
            AuthProvider::Github => "GITHUB",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, AuthProvider::Local)
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        AuthProvider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidAuthProvider(s.to_string()))
    }
}

/// Rejects empty and whitespace-only text.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Personal details shared by registration and the stored account.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Profile {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub surname: String,
    #[validate(range(min = 0, message = "age must not be negative"))]
    pub age: i32,
    pub gender: Gender,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// An account that has not been stored yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    profile: Profile,
    username: String,
    email: String,
    password: Option<HashedPassword>,
    auth_provider: AuthProvider,
}

impl NewUser {
    pub fn local(profile: Profile, username: String, email: String, password: HashedPassword) -> Self {
        Self {
            profile,
            username,
            email,
            password: Some(password),
            auth_provider: AuthProvider::Local,
        }
    }

    /// Account verified by an external identity provider; no password is stored.
    pub fn federated(
        profile: Profile,
        username: String,
        email: String,
        auth_provider: AuthProvider,
    ) -> Result<Self, DomainError> {
        if auth_provider.is_local() {
            return Err(DomainError::MissingCredential);
        }
        Ok(Self {
            profile,
            username,
            email,
            password: None,
            auth_provider,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn password(&self) -> Option<&HashedPassword> {
        self.password.as_ref()
    }
    pub fn auth_provider(&self) -> AuthProvider {
        self.auth_provider
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    profile: Profile,
    username: String,
    email: String,
    password: Option<HashedPassword>,
    auth_provider: AuthProvider,
}

impl User {
    /// Gives a freshly stored account its id.
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self {
            id,
            profile: new_user.profile,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            auth_provider: new_user.auth_provider,
        }
    }

    pub fn reconstruct(
        id: UserId,
        profile: Profile,
        username: String,
        email: String,
        password: Option<HashedPassword>,
        auth_provider: AuthProvider,
    ) -> Result<Self, DomainError> {
        if auth_provider.is_local() && password.is_none() {
            return Err(DomainError::MissingCredential);
        }
        Ok(Self {
            id,
            profile,
            username,
            email,
            password,
            auth_provider,
        })
    }

    pub fn can_authenticate_with_password(&self) -> bool {
        self.auth_provider.is_local() && self.password.is_some()
    }

    pub fn update_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn change_password(&mut self, password: HashedPassword) -> Result<(), DomainError> {
        if !self.auth_provider.is_local() {
            return Err(DomainError::ExternalProvider(self.auth_provider));
        }
        self.password = Some(password);
        Ok(())
    }

    // getters only
    pub fn id(&self) -> UserId {
        self.id
    }
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
    pub fn first_name(&self) -> &str {
        &self.profile.first_name
    }
    pub fn surname(&self) -> &str {
        &self.profile.surname
    }
    pub fn age(&self) -> i32 {
        self.profile.age
    }
    pub fn gender(&self) -> Gender {
        self.profile.gender
    }
    pub fn city(&self) -> Option<&str> {
        self.profile.city.as_deref()
    }
    pub fn state(&self) -> Option<&str> {
        self.profile.state.as_deref()
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn password(&self) -> Option<&HashedPassword> {
        self.password.as_ref()
    }
    pub fn auth_provider(&self) -> AuthProvider {
        self.auth_provider
    }
}
