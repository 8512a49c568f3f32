//! Users-related HTTP API.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::Result;
use crate::user::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub email: String,
}

/// Handler to create user.
async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<Body>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(body) = body?;
    let user = state.users.create(&body.name, &body.email).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn hello() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /users` goes to `create`.
        .route("/", get(hello).post(create))
}
