use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{
    error::DomainError,
    models::{
        credential::HashedPassword,
        user::{Gender, NewUser, Profile, not_blank},
    },
};

/// Registration payload as submitted by the client, plaintext password included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub surname: String,
    #[validate(range(min = 0, message = "age must not be negative"))]
    pub age: i32,
    pub gender: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(email(message = "email address is invalid"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationRequest {
    /// Field rules first, then the password confirmation, then the gender value.
    pub fn check(&self) -> Result<Gender, DomainError> {
        self.validate()?;
        if self.password != self.confirm_password {
            return Err(DomainError::PasswordMismatch);
        }
        self.gender.parse()
    }

    /// Consumes the request; the plaintext password does not outlive it.
    pub fn into_new_user(self, gender: Gender, password: HashedPassword) -> NewUser {
        let profile = Profile {
            first_name: self.first_name,
            surname: self.surname,
            age: self.age,
            gender,
            city: self.city,
            state: self.state,
        };
        NewUser::local(profile, self.username, self.email, password)
    }
}
