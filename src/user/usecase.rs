//! User signup.

use std::sync::Arc;

use crate::error::{Result, ServerError};
use crate::user::{User, UserRepository};

/// User use case service.
#[derive(Clone)]
pub struct UserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl UserUseCase {
    /// Create a new [`UserUseCase`].
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Create a user if the email is not already in use.
    ///
    /// The lookup is a fast path. Concurrent signups with the same email are
    /// settled by the repository's unique constraint.
    pub async fn create(&self, name: &str, email: &str) -> Result<User> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(ServerError::UserAlreadyExists);
        }

        let user = self.repo.create(name, email).await?;
        tracing::debug!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Find a user using `email` field.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repo.find_by_email(email).await
    }
}
