//! Middlewares for routes.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{Result, ServerError};

/// Header carrying the email of the calling user.
pub const EMAIL_HEADER: &str = "email";

/// Email of the calling user, set by [`require_email`].
#[derive(Clone, Debug, PartialEq)]
pub struct UserEmail(pub String);

/// Reject requests without an `email` header.
///
/// This identifies the caller, it does not authenticate them: no credential
/// is checked.
pub async fn require_email(mut req: Request, next: Next) -> Result<Response> {
    let email = req
        .headers()
        .get(EMAIL_HEADER)
        .and_then(|header| std::str::from_utf8(header.as_bytes()).ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(ToOwned::to_owned)
        .ok_or(ServerError::MissingEmail)?;

    req.extensions_mut().insert(UserEmail(email));
    Ok(next.run(req).await)
}
