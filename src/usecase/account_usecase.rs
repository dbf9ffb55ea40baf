use tracing::{info, warn};
use validator::Validate;

use crate::domain::{
    error::{DomainError, RepositoryError},
    models::user::{Profile, User, UserId},
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

pub struct AccountUsecase<U: UserRepository, P: PasswordHasher> {
    user_repository: U,
    password_hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> AccountUsecase<U, P>
where
    U: Send + Sync,
    P: Send + Sync,
{
    pub fn new(user_repository: U, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    async fn load(&self, id: UserId) -> Result<User, DomainError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    async fn store(&self, user: &User) -> Result<(), DomainError> {
        self.user_repository.update(user).await.map_err(|e| match e {
            RepositoryError::NotFound => DomainError::UserNotFound,
            other => other.into(),
        })
    }

    pub async fn update_profile(&self, id: UserId, profile: Profile) -> Result<User, DomainError> {
        profile.validate()?;

        let mut user = self.load(id).await?;
        user.update_profile(profile);
        self.store(&user).await?;

        info!(%id, "profile updated");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), DomainError> {
        let mut user = self.load(id).await?;
        if !user.auth_provider().is_local() {
            return Err(DomainError::ExternalProvider(user.auth_provider()));
        }

        let current_hash = user.password().ok_or(DomainError::MissingCredential)?;
        if !self.password_hasher.verify(current_password, current_hash)? {
            warn!(%id, "password change rejected: wrong current password");
            return Err(DomainError::AuthenticationFailed);
        }
        if new_password != confirm_password {
            return Err(DomainError::PasswordMismatch);
        }

        user.change_password(self.password_hasher.hash(new_password)?)?;
        self.store(&user).await?;

        info!(%id, "password changed");
        Ok(())
    }

    pub async fn delete_account(&self, id: UserId) -> Result<(), DomainError> {
        self.user_repository.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => DomainError::UserNotFound,
            other => other.into(),
        })
    }
}
