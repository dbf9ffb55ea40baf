use crate::domain::{error::DomainError, models::credential::HashedPassword};

/// Shortest plaintext password accepted for local accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Turns plaintext passwords into stored credentials and checks them on sign-in.
pub trait PasswordHasher: Clone {
    /// Fails with `DomainError::WeakPassword` below `MIN_PASSWORD_LENGTH` characters.
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError>;

    fn verify(&self, plain_password: &str, hashed_password: &HashedPassword) -> Result<bool, DomainError>;
}
