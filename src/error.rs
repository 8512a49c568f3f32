//! Error handler for contacta.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sqlx::Error as SQLxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("Email is required")]
    MissingEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Contact already exists")]
    ContactAlreadyExists,

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),
}

impl ServerError {
    /// HTTP status of each error kind.
    ///
    /// Every handler goes through this table, so a kind maps to the same
    /// status on all routes.
    pub fn status(&self) -> StatusCode {
        match self {
            // 415 on a missing `Content-Type`, 422 on a body of the wrong
            // shape, 400 on invalid JSON.
            ServerError::Json(rejection) => rejection.status(),
            ServerError::Path(_) => StatusCode::BAD_REQUEST,
            ServerError::MissingEmail => StatusCode::UNAUTHORIZED,
            ServerError::UserNotFound | ServerError::ContactNotFound => {
                StatusCode::NOT_FOUND
            },
            ServerError::UserAlreadyExists
            | ServerError::ContactAlreadyExists => StatusCode::CONFLICT,
            ServerError::Sql(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ServerError::Json(_) | ServerError::Path(_) => "Malformed request.",
            ServerError::MissingEmail => "Missing 'email' header.",
            ServerError::UserNotFound | ServerError::ContactNotFound => {
                "Resource not found."
            },
            ServerError::UserAlreadyExists
            | ServerError::ContactAlreadyExists => "Resource already exists.",
            ServerError::Sql(_) => "Internal server error.",
        }
    }
}

/// Structure for error responses.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub status: u16,
    pub title: String,
    pub message: String,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Update `message` field.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            title: "Internal server error.".to_owned(),
            message: String::default(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let response = if status.is_server_error() {
            tracing::error!(error = %self, "server returned 500 status");
            ResponseError::default()
        } else {
            ResponseError::default()
                .status(status)
                .title(self.title())
                .message(&self.to_string())
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "title": "Internal server error.",
                "message": "",
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

/// Turn a database unique violation into a domain conflict.
///
/// The schema carries `UNIQUE` constraints on every field checked by the use
/// cases, so two racing creates end up here instead of in a 500.
pub trait OrConflict<T> {
    fn or_conflict(self, conflict: ServerError) -> Result<T>;
}

impl<T> OrConflict<T> for std::result::Result<T, SQLxError> {
    fn or_conflict(self, conflict: ServerError) -> Result<T> {
        self.map_err(|err| match err.as_database_error() {
            Some(db) if db.is_unique_violation() => conflict,
            _ => ServerError::Sql(err),
        })
    }
}
