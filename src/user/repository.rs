//! Handle user persistence.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrConflict, Result, ServerError};
use crate::user::User;

/// Port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new [`User`] and return it with its generated id.
    async fn create(&self, name: &str, email: &str) -> Result<User>;

    /// Find a [`User`] using `email` field.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, name: &str, email: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email) VALUES ($1, $2, $3)
                RETURNING id, name, email"#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .or_conflict(ServerError::UserAlreadyExists)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, name, email FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }
}

/// In-memory user repository.
///
/// Enforces the same email uniqueness as the `users` table.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, name: &str, email: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|user| user.email == email) {
            return Err(ServerError::UserAlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: email.to_owned(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }
}
