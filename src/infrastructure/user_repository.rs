use async_trait::async_trait;
use entity::users;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info, warn};

use crate::domain::{
    error::RepositoryError,
    models::{
        credential::HashedPassword,
        user::{AuthProvider, Gender, NewUser, Profile, User, UserId},
    },
    repositories::user_repository::UserRepository,
};

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn database_error(e: DbErr) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

/// Drivers quote the rejected value too, so only the text after the key
/// marker names the column.
/// MySQL: `Duplicate entry 'v' for key 'users.email'`,
/// SQLite: `UNIQUE constraint failed: users.email`,
/// Postgres: `duplicate key value violates unique constraint "users_email_key"`.
fn violated_key(message: &str) -> &str {
    ["for key ", "constraint failed: ", "unique constraint "]
        .iter()
        .find_map(|marker| message.rfind(marker).map(|at| &message[at + marker.len()..]))
        .unwrap_or(message)
}

fn duplicate_column(message: &str) -> Option<RepositoryError> {
    let key = violated_key(message);
    if key.contains("username") {
        Some(RepositoryError::DuplicateUsername)
    } else if key.contains("email") {
        Some(RepositoryError::DuplicateEmail)
    } else {
        None
    }
}

fn insert_error(e: DbErr) -> RepositoryError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            duplicate_column(&message).unwrap_or_else(|| database_error(e))
        }
        _ => database_error(e),
    }
}

fn to_domain(model: users::Model) -> Result<User, RepositoryError> {
    let gender = model
        .gender
        .parse::<Gender>()
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
    let auth_provider = model
        .auth_provider
        .parse::<AuthProvider>()
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    let profile = Profile {
        first_name: model.first_name,
        surname: model.surname,
        age: model.age,
        gender,
        city: model.city,
        state: model.state,
    };

    User::reconstruct(
        UserId::new(model.id),
        profile,
        model.username,
        model.email,
        model.password.map(HashedPassword::new),
        auth_provider,
    )
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

async fn find_one<C: ConnectionTrait>(
    db: &C,
    column: users::Column,
    value: &str,
) -> Result<Option<users::Model>, RepositoryError> {
    users::Entity::find()
        .filter(column.eq(value))
        .one(db)
        .await
        .map_err(database_error)
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let txn = self.db.begin().await.map_err(database_error)?;

        if find_one(&txn, users::Column::Username, new_user.username())
            .await?
            .is_some()
        {
            warn!(username = new_user.username(), "username already taken");
            return Err(RepositoryError::DuplicateUsername);
        }
        if find_one(&txn, users::Column::Email, new_user.email())
            .await?
            .is_some()
        {
            warn!(email = new_user.email(), "email already registered");
            return Err(RepositoryError::DuplicateEmail);
        }

        let profile = new_user.profile();
        let user_model = users::ActiveModel {
            id: NotSet,
            first_name: Set(profile.first_name.clone()),
            surname: Set(profile.surname.clone()),
            age: Set(profile.age),
            gender: Set(profile.gender.as_str().to_string()),
            city: Set(profile.city.clone()),
            state: Set(profile.state.clone()),
            username: Set(new_user.username().to_string()),
            email: Set(new_user.email().to_string()),
            password: Set(new_user.password().map(|hash| hash.as_str().to_string())),
            auth_provider: Set(new_user.auth_provider().as_str().to_string()),
        };

        let insert_result = users::Entity::insert(user_model)
            .exec(&txn)
            .await
            .map_err(insert_error)?;

        txn.commit().await.map_err(database_error)?;

        let id = UserId::new(insert_result.last_insert_id);
        info!(%id, username = new_user.username(), "user stored");
        Ok(User::from_new(id, new_user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        debug!(%id, "find user by id");
        users::Entity::find_by_id(id.value())
            .one(&self.db)
            .await
            .map_err(database_error)?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        debug!(username, "find user by username");
        find_one(&self.db, users::Column::Username, username)
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        debug!(email, "find user by email");
        find_one(&self.db, users::Column::Email, email)
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let user_model = users::ActiveModel {
            id: Unchanged(user.id().value()),
            first_name: Set(user.first_name().to_string()),
            surname: Set(user.surname().to_string()),
            age: Set(user.age()),
            gender: Set(user.gender().as_str().to_string()),
            city: Set(user.city().map(str::to_string)),
            state: Set(user.state().map(str::to_string)),
            password: Set(user.password().map(|hash| hash.as_str().to_string())),
            ..Default::default()
        };

        match users::Entity::update(user_model).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(database_error(e)),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = users::Entity::delete_by_id(id.value())
            .exec(&self.db)
            .await
            .map_err(database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        info!(%id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use sea_orm::{ConnectOptions, Database};

    use super::*;
    use crate::infrastructure::database::ensure_schema;

    async fn connect() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[fixture]
    async fn repository() -> SeaOrmUserRepository {
        SeaOrmUserRepository::new(connect().await)
    }

    fn profile() -> Profile {
        Profile {
            first_name: "Jennifer".to_string(),
            surname: "Smith".to_string(),
            age: 34,
            gender: Gender::Female,
            city: Some("Madison".to_string()),
            state: None,
        }
    }

    fn local_user(username: &str, email: &str) -> NewUser {
        NewUser::local(
            profile(),
            username.to_string(),
            email.to_string(),
            HashedPassword::new("$argon2id$hash".to_string()),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_and_find(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let created = repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();

        let by_id = repository.find_by_id(created.id()).await.unwrap().unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_id.gender(), Gender::Female);
        assert_eq!(by_id.auth_provider(), AuthProvider::Local);
        assert_eq!(by_id.city(), Some("Madison"));
        assert_eq!(by_id.state(), None);

        let by_username = repository.find_by_username("jsmith").await.unwrap();
        assert_eq!(by_username, Some(created.clone()));
        let by_email = repository
            .find_by_email("jennifer@example.com")
            .await
            .unwrap();
        assert_eq!(by_email, Some(created));
        assert_eq!(repository.find_by_username("nobody").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_ids_are_distinct(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let first = repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        let second = repository
            .create(local_user("bwhite", "bob@example.com"))
            .await
            .unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[rstest]
    #[tokio::test]
    async fn test_duplicate_username_negative(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        let result = repository
            .create(local_user("jsmith", "other@example.com"))
            .await;
        assert_eq!(result.unwrap_err(), RepositoryError::DuplicateUsername);
    }

    #[rstest]
    #[tokio::test]
    async fn test_duplicate_email_negative(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        let result = repository
            .create(local_user("jsmith2", "jennifer@example.com"))
            .await;
        assert_eq!(result.unwrap_err(), RepositoryError::DuplicateEmail);
    }

    #[rstest]
    #[tokio::test]
    async fn test_federated_user_round_trip(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let new_user = NewUser::federated(
            profile(),
            "jsmith".to_string(),
            "jennifer@example.com".to_string(),
            AuthProvider::Google,
        )
        .unwrap();
        let created = repository.create(new_user).await.unwrap();

        let found = repository.find_by_id(created.id()).await.unwrap().unwrap();
        assert_eq!(found.auth_provider(), AuthProvider::Google);
        assert!(found.password().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_update(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let mut user = repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        let mut profile = profile();
        profile.age = 35;
        profile.gender = Gender::PreferNotToSay;
        user.update_profile(profile);
        user.change_password(HashedPassword::new("$argon2id$other".to_string()))
            .unwrap();

        repository.update(&user).await.unwrap();

        let found = repository.find_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(found, user);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let user = repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        repository.delete(user.id()).await.unwrap();

        assert_eq!(repository.find_by_id(user.id()).await.unwrap(), None);
        assert_eq!(
            repository.delete(user.id()).await.unwrap_err(),
            RepositoryError::NotFound
        );
    }

    #[rstest]
    #[case("Duplicate entry 'email_fan' for key 'users.username'", Some(RepositoryError::DuplicateUsername))]
    #[case("Duplicate entry 'username@example.com' for key 'users.email'", Some(RepositoryError::DuplicateEmail))]
    #[case("Duplicate entry 'jsmith' for key 'username'", Some(RepositoryError::DuplicateUsername))]
    #[case("UNIQUE constraint failed: users.email", Some(RepositoryError::DuplicateEmail))]
    #[case("UNIQUE constraint failed: users.username", Some(RepositoryError::DuplicateUsername))]
    #[case(
        "duplicate key value violates unique constraint \"users_email_key\"",
        Some(RepositoryError::DuplicateEmail)
    )]
    #[case("Duplicate entry 'email' for key 'PRIMARY'", None)]
    fn test_duplicate_column(#[case] message: &str, #[case] expected: Option<RepositoryError>) {
        assert_eq!(duplicate_column(message), expected);
    }

    fn row(username: &str, email: &str) -> users::ActiveModel {
        users::ActiveModel {
            id: NotSet,
            first_name: Set("Jennifer".to_string()),
            surname: Set("Smith".to_string()),
            age: Set(34),
            gender: Set(Gender::Female.as_str().to_string()),
            city: Set(None),
            state: Set(None),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password: Set(Some("$argon2id$hash".to_string())),
            auth_provider: Set(AuthProvider::Local.as_str().to_string()),
        }
    }

    #[rstest]
    #[case("email_fan", "other@example.com", RepositoryError::DuplicateUsername)]
    #[case("username_fan", "email_fan@example.com", RepositoryError::DuplicateEmail)]
    #[tokio::test]
    async fn test_unique_index_violation_mapping(
        #[case] username: &str,
        #[case] email: &str,
        #[case] expected: RepositoryError,
    ) {
        let db = connect().await;
        users::Entity::insert(row("email_fan", "email_fan@example.com"))
            .exec(&db)
            .await
            .unwrap();

        let err = users::Entity::insert(row(username, email))
            .exec(&db)
            .await
            .unwrap_err();
        assert_eq!(insert_error(err), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_unknown_stored_gender_negative(#[future] repository: SeaOrmUserRepository) {
        let repository = repository.await;

        let user = repository
            .create(local_user("jsmith", "jennifer@example.com"))
            .await
            .unwrap();
        let corrupt = users::ActiveModel {
            id: Unchanged(user.id().value()),
            gender: Set("UNKNOWN".to_string()),
            ..Default::default()
        };
        users::Entity::update(corrupt)
            .exec(&repository.db)
            .await
            .unwrap();

        let result = repository.find_by_id(user.id()).await;
        assert!(matches!(result, Err(RepositoryError::DatabaseError(_))));
    }
}
