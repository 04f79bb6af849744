//! `x-api-key` authentication for write endpoints

use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::warn;

use crate::api::types::ApiResponse;
use crate::api::types::INVALID_API_KEY;
use crate::security::authenticate_api_key;
use crate::security::ApiSecret;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct ApiKeyState {
    pub secret: Arc<ApiSecret>,
}

impl ApiKeyState {
    pub fn new(secret: ApiSecret) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }
}

/// Reject requests whose `x-api-key` does not match the configured write secret
pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match supplied {
        Some(key) if authenticate_api_key(&state.secret, key) => next.run(request).await,
        Some(_) => {
            warn!("Rejected {} with an invalid API key", request.uri().path());
            unauthorized()
        }
        None => {
            warn!("Rejected {} without an API key", request.uri().path());
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::rejected(INVALID_API_KEY)),
    )
        .into_response()
}
