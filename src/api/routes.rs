//! API route definitions

use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::auth::api_key_middleware;
use super::auth::ApiKeyState;
use super::handlers::AppState;
use super::handlers;

/// Create the service router
///
/// The chatbot routes are served under `prefix` and again under `/api{prefix}`;
/// `/healthcheck` is always at the root and needs no key.
pub fn api_routes(state: AppState, auth: ApiKeyState, prefix: &str) -> Router {
    let chatbot = chatbot_routes(state.clone(), auth);
    let prefix = prefix.trim_end_matches('/');

    let router = Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .with_state(state);

    if prefix.is_empty() {
        return router
            .merge(chatbot.clone())
            .nest("/api", chatbot);
    }

    let router = router.nest(prefix, chatbot.clone());
    if prefix == "/api" || prefix.starts_with("/api/") {
        router
    } else {
        router.nest(&format!("/api{prefix}"), chatbot)
    }
}

/// Write endpoints, all behind the API key check
fn chatbot_routes(state: AppState, auth: ApiKeyState) -> Router {
    Router::new()
        .route("/generate/query", post(handlers::generate_query))
        .route_layer(middleware::from_fn_with_state(auth, api_key_middleware))
        .with_state(state)
}
