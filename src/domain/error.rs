use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::models::user::AuthProvider;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Weak password (minimum 8 characters required)")]
    WeakPassword,

    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid gender: {0}")]
    InvalidGender(String),

    #[error("Invalid auth provider: {0}")]
    InvalidAuthProvider(String),

    #[error("Local accounts require a password hash")]
    MissingCredential,

    #[error("Account is managed by {0}")]
    ExternalProvider(AuthProvider),

    #[error("User not found")]
    UserNotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
