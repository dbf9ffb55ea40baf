use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{
    error::RepositoryError,
    models::user::{NewUser, User, UserId},
    repositories::user_repository::UserRepository,
};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    username_index: HashMap<String, UserId>,
    email_index: HashMap<String, UserId>,
    last_id: i64,
}

/// Process-local storage. Ids start at 1 and are not handed out again after
/// a delete.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::DatabaseError("user store lock poisoned".to_string())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut store = self.store.write().map_err(poisoned)?;

        if store.username_index.contains_key(new_user.username()) {
            warn!(username = new_user.username(), "username already taken");
            return Err(RepositoryError::DuplicateUsername);
        }
        if store.email_index.contains_key(new_user.email()) {
            warn!(email = new_user.email(), "email already registered");
            return Err(RepositoryError::DuplicateEmail);
        }

        store.last_id += 1;
        let id = UserId::new(store.last_id);
        let user = User::from_new(id, new_user);

        store.username_index.insert(user.username().to_string(), id);
        store.email_index.insert(user.email().to_string(), id);
        store.users.insert(id, user.clone());

        info!(%id, username = user.username(), "user stored");
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().map_err(poisoned)?;
        Ok(store.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().map_err(poisoned)?;
        Ok(store
            .username_index
            .get(username)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let store = self.store.read().map_err(poisoned)?;
        Ok(store
            .email_index
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut store = self.store.write().map_err(poisoned)?;
        let stored = store
            .users
            .get_mut(&user.id())
            .ok_or(RepositoryError::NotFound)?;

        // username, email and provider stay as stored
        stored.update_profile(user.profile().clone());
        if let Some(password) = user.password() {
            stored
                .change_password(password.clone())
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut store = self.store.write().map_err(poisoned)?;
        let user = store.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        store.username_index.remove(user.username());
        store.email_index.remove(user.email());
        info!(%id, "user deleted");
        Ok(())
    }
}
