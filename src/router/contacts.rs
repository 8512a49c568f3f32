//! Contacts-related HTTP API.
//!
//! Every route requires the `email` header.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::contact::Contact;
use crate::error::Result;
use crate::middleware::{UserEmail, require_email};

#[derive(Debug, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub email: String,
    pub phone: String,
}

type JsonBody = std::result::Result<Json<Body>, JsonRejection>;
type ContactId = std::result::Result<Path<Uuid>, PathRejection>;

async fn create(
    State(state): State<AppState>,
    Extension(UserEmail(user_email)): Extension<UserEmail>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Contact>)> {
    let Json(body) = body?;
    let contact = state
        .contacts
        .create(&body.email, &body.name, &body.phone, &user_email)
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

async fn list(
    State(state): State<AppState>,
    Extension(UserEmail(user_email)): Extension<UserEmail>,
) -> Result<Json<Vec<Contact>>> {
    Ok(Json(state.contacts.list_all_contacts(&user_email).await?))
}

async fn update(
    State(state): State<AppState>,
    id: ContactId,
    body: JsonBody,
) -> Result<Json<Contact>> {
    let Path(id) = id?;
    let Json(body) = body?;

    Ok(Json(
        state
            .contacts
            .update_contact(id, &body.name, &body.email, &body.phone)
            .await?,
    ))
}

async fn delete(
    State(state): State<AppState>,
    id: ContactId,
) -> Result<Json<bool>> {
    let Path(id) = id?;
    Ok(Json(state.contacts.delete(id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /contacts` goes to `list`, `POST /contacts` to `create`.
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete))
        .route_layer(middleware::from_fn(require_email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseError;
    use crate::*;
    use axum::http::Method;
    use http_body_util::BodyExt;
    use serde_json::json;

    const ANA: &str = "ana@x.com";

    async fn signup(app: &Router) -> user::User {
        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            None,
            json!({ "name": "Ana", "email": ANA }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn create_contact(
        app: &Router,
        email: &str,
        phone: &str,
    ) -> axum::http::Response<axum::body::Body> {
        make_request(
            app.clone(),
            Method::POST,
            "/contacts",
            Some(ANA),
            json!({ "name": "Bob", "email": email, "phone": phone })
                .to_string(),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_then_conflict_on_phone() {
        let app = app(memory_state());
        let ana = signup(&app).await;

        let response = create_contact(&app, "bob@x.com", "123").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let contact: Contact = serde_json::from_slice(&body).unwrap();
        assert_eq!(contact.user_id, ana.id);
        assert_eq!(contact.phone, "123");

        let response = create_contact(&app, "robert@x.com", "123").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.message, "Contact already exists");
    }

    #[tokio::test]
    async fn test_contact_json_uses_camel_case() {
        let app = app(memory_state());
        signup(&app).await;

        let response = create_contact(&app, "bob@x.com", "123").await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body.get("userId").is_some());
    }

    #[tokio::test]
    async fn test_create_for_unknown_user() {
        let app = app(memory_state());

        let response = create_contact(&app, "bob@x.com", "123").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_email_header() {
        let state = memory_state();
        let app = app(state.clone());
        signup(&app).await;

        let response = make_request(
            app.clone(),
            Method::GET,
            "/contacts",
            None,
            String::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.message, "Email is required");

        // A rejected create must not reach the store.
        let response = make_request(
            app,
            Method::POST,
            "/contacts",
            None,
            json!({ "name": "Bob", "email": "bob@x.com", "phone": "123" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(
            state
                .contacts
                .list_all_contacts(ANA)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_empty_email_header() {
        let app = app(memory_state());

        let response =
            make_request(app, Method::GET, "/contacts", Some(""), String::new())
                .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_ascii_email_header() {
        let app = app(memory_state());
        let email = "josé@x.com";

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            None,
            json!({ "name": "José", "email": email }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/contacts",
            Some(email),
            json!({ "name": "Bob", "email": "bob@x.com", "phone": "123" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response =
            make_request(app, Method::GET, "/contacts", Some(email), String::new())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let list: Vec<Contact> = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].email, "bob@x.com");
    }

    #[tokio::test]
    async fn test_invalid_utf8_email_header() {
        use axum::extract::Request;
        use axum::http::HeaderValue;
        use tower::util::ServiceExt;

        let app = app(memory_state());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/contacts")
            .header(
                crate::middleware::EMAIL_HEADER,
                HeaderValue::from_bytes(b"ana\xff@x.com").unwrap(),
            )
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_and_delete_require_email_header() {
        let state = memory_state();
        let app = app(state.clone());
        signup(&app).await;

        let response = create_contact(&app, "bob@x.com", "123").await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let bob: Contact = serde_json::from_slice(&body).unwrap();
        let path = format!("/contacts/{}", bob.id);

        let response = make_request(
            app.clone(),
            Method::PUT,
            &path,
            None,
            json!({ "name": "Robert", "email": "robert@x.com", "phone": "456" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response =
            make_request(app, Method::DELETE, &path, None, String::new()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.message, "Email is required");

        // Neither request reached the store.
        let list = state.contacts.list_all_contacts(ANA).await.unwrap();
        assert_eq!(list, vec![bob]);
    }

    #[tokio::test]
    async fn test_list_update_delete() {
        let app = app(memory_state());
        signup(&app).await;

        let response = create_contact(&app, "bob@x.com", "123").await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let bob: Contact = serde_json::from_slice(&body).unwrap();

        let path = format!("/contacts/{}", bob.id);
        let response = make_request(
            app.clone(),
            Method::PUT,
            &path,
            Some(ANA),
            json!({ "name": "Robert", "email": "robert@x.com", "phone": "456" })
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            app.clone(),
            Method::GET,
            "/contacts",
            Some(ANA),
            String::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let list: Vec<Contact> = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Robert");

        let response = make_request(
            app.clone(),
            Method::DELETE,
            &path,
            Some(ANA),
            String::new(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"true");

        let response =
            make_request(app, Method::DELETE, &path, Some(ANA), String::new())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"false");
    }

    #[tokio::test]
    async fn test_update_unknown_and_invalid_id() {
        let app = app(memory_state());
        let body =
            json!({ "name": "Bob", "email": "bob@x.com", "phone": "1" })
                .to_string();

        let path = format!("/contacts/{}", Uuid::new_v4());
        let response = make_request(
            app.clone(),
            Method::PUT,
            &path,
            Some(ANA),
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = make_request(
            app,
            Method::PUT,
            "/contacts/not-a-uuid",
            Some(ANA),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
