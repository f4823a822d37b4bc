use crate::error::RedirectError;
use crate::service::Redirector;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Handler dependencies, injected at construction time.
#[derive(Clone)]
pub struct AppState {
    pub redirector: Arc<dyn Redirector>,
}

/// Builds the redirector's HTTP surface: `GET /short/{code}`,
/// `GET /health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/short/", get(empty_code_handler))
        .route("/short/:code", get(redirect_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn empty_code_handler() -> Response {
    (StatusCode::BAD_REQUEST, "expected /short/<code>").into_response()
}

async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.redirector.resolve(&code).await {
        Ok(Some(long_url)) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, long_url)],
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "short code not found").into_response(),
        Err(RedirectError::InvalidCode(e)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "redirect request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
