pub mod argon2_password_hasher;
pub mod database;
pub mod memory_user_repository;
pub mod user_repository;
