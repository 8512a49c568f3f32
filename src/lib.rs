//! Contacta keeps track of users and their contacts.

#![forbid(unsafe_code)]
pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod middleware;
mod router;
pub mod telemetry;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use contact::ContactUseCase;
use database::Database;
use user::UserUseCase;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    email: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use axum::http::HeaderValue;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(email) = email {
        // `from_bytes` keeps non-ASCII addresses, `&str` values would be refused.
        let email = HeaderValue::from_bytes(email.as_bytes()).unwrap();
        request = request.header(middleware::EMAIL_HEADER, email);
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State backed by in-memory repositories.
#[cfg(test)]
pub fn memory_state() -> AppState {
    AppState::new(Database::memory(), None)
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub users: UserUseCase,
    pub contacts: ContactUseCase,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire use cases over the repositories of `db`.
    pub fn new(db: Database, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            users: UserUseCase::new(Arc::clone(&db.users)),
            contacts: ContactUseCase::new(db.contacts, db.users),
            metrics,
        }
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Remove caller identity from traces.
        .layer(SetSensitiveHeadersLayer::new([
            HeaderName::from_static(middleware::EMAIL_HEADER),
            header::AUTHORIZATION,
        ]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /metrics` goes to the Prometheus handle.
        .route("/metrics", get(router::metrics::handler))
        .nest("/users", router::users::router())
        .nest("/contacts", router::contacts::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: &config::Configuration,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let db = Database::from_config(config).await?;

    Ok(AppState::new(db, metrics))
}
