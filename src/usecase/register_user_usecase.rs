use tracing::{info, warn};

use crate::domain::{
    error::DomainError,
    models::{registration::RegistrationRequest, user::User},
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

pub struct RegisterUserUsecase<R: UserRepository, P: PasswordHasher> {
    user_repository: R,
    password_hasher: P,
}

impl<R: UserRepository, P: PasswordHasher> RegisterUserUsecase<R, P> {
    pub fn new(user_repository: R, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Validates the request and stores a new local account.
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        let gender = request.check().inspect_err(|e| {
            warn!(username = %request.username, error = %e, "registration rejected");
        })?;

        let password_hash = self.password_hasher.hash(&request.password)?;

        let user = self
            .user_repository
            .create(request.into_new_user(gender, password_hash))
            .await?;

        info!(id = %user.id(), username = user.username(), "user registered");
        Ok(user)
    }
}
