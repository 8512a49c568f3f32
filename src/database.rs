//! Persistence backends.
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::{self, Configuration};
use crate::contact::{
    ContactRepository, MemoryContactRepository, PgContactRepository,
};
use crate::user::{MemoryUserRepository, PgUserRepository, UserRepository};

/// Repositories shared by the use cases.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

impl Database {
    /// Connect to PostgreSQL and run migrations.
    pub async fn postgres(url: &str, pool: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres: PgPool = pool.connect(url).await?;

        tracing::info!("postgres connected");

        // execute migrations scripts on start.
        sqlx::migrate!().run(&postgres).await?;

        Ok(Self {
            users: Arc::new(PgUserRepository::new(postgres.clone())),
            contacts: Arc::new(PgContactRepository::new(postgres)),
        })
    }

    /// Volatile store, lost on restart.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            contacts: Arc::new(MemoryContactRepository::default()),
        }
    }

    /// Select the backend described by `config`.
    pub async fn from_config(config: &Configuration) -> Result<Self, sqlx::Error> {
        match &config.postgres {
            Some(postgres) => {
                Self::postgres(
                    &postgres.url,
                    postgres.pool_size.unwrap_or(config::DEFAULT_POOL_SIZE),
                )
                .await
            },
            None => {
                tracing::warn!(
                    "missing `postgres` entry on `config.yaml` file, using in-memory store"
                );
                Ok(Self::memory())
            },
        }
    }
}
