use crate::error::ShortenError;
use crate::service::Shortener;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Handler dependencies, injected at construction time.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn Shortener>,
    /// Public base used to render `short_url` in responses.
    pub base_url: String,
}

/// Builds the shortener's HTTP surface: `POST /create`, `GET /health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub long_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub short_url: String,
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid request body: {rejection}"),
            )
                .into_response();
        }
    };

    match state.shortener.shorten(&request.long_url).await {
        Ok(code) => Json(CreateResponse {
            short_url: code.to_url(&state.base_url),
        })
        .into_response(),
        Err(ShortenError::InvalidUrl(reason)) => (StatusCode::BAD_REQUEST, reason).into_response(),
        Err(e) => {
            // Allocator and cache failures carry operational detail the
            // client has no use for.
            error!(error = %e, "create request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
