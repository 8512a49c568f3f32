mod repository;
mod usecase;

pub use repository::*;
pub use usecase::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_id: Uuid,
}

/// New values of the mutable fields of a [`Contact`].
#[derive(Clone, Debug, PartialEq)]
pub struct ContactUpdate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}
