use tracing::{debug, warn};

use crate::domain::{
    error::DomainError,
    models::user::User,
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

/// Checks a username/password pair against a stored local account.
/// Accounts of other providers are reported back so the caller can hand off
/// to that provider.
pub struct AuthenticateUsecase<U: UserRepository, P: PasswordHasher> {
    user_repository: U,
    password_hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> AuthenticateUsecase<U, P> {
    pub fn new(user_repository: U, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError>
    where
        U: Send + Sync,
        P: Send + Sync,
    {
        let Some(user) = self.user_repository.find_by_username(username).await? else {
            warn!(username, "authentication failed: unknown user");
            return Err(DomainError::AuthenticationFailed);
        };

        if !user.auth_provider().is_local() {
            debug!(username, provider = %user.auth_provider(), "delegating to identity provider");
            return Err(DomainError::ExternalProvider(user.auth_provider()));
        }

        let password_hash = user.password().ok_or(DomainError::MissingCredential)?;
        if !self.password_hasher.verify(password, password_hash)? {
            warn!(username, "authentication failed: wrong password");
            return Err(DomainError::AuthenticationFailed);
        }

        Ok(user)
    }
}
