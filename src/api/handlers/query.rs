/// Generate-query handler
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::validation::validate_generate_query;
use crate::models::CreateQueryRequest;
use crate::models::InsertOutcome;

/// POST {prefix}/generate/query
pub async fn generate_query(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match validate_generate_query(&body) {
        Ok(request) => request,
        Err(errors) => {
            warn!("Rejected generate/query body: {:?}", errors.errors);
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response();
        }
    };

    let question = request.query.unwrap_or_default();
    info!("POST generate/query: {}", question);

    if !question.is_empty() {
        record_query(&state, &question).await;
    }

    match state.rag.query(&question).await {
        Ok(response) => {
            (StatusCode::CREATED, Json(ApiResponse::success(response.answer))).into_response()
        }
        Err(e) => {
            if e.is_provider_error() {
                error!("Provider failure during RAG query: {}", e);
            } else {
                error!("Error processing RAG query: {}", e);
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<String>::failed(e.to_string())),
            )
                .into_response()
        }
    }
}

async fn record_query(state: &AppState, question: &str) {
    let Some(database) = &state.database else {
        return;
    };

    let request = CreateQueryRequest {
        text: question.to_string(),
    };
    match database.create_query(request).await {
        Ok(InsertOutcome::Created) => info!("Recorded new query"),
        Ok(InsertOutcome::AlreadyExists) => info!("Query already recorded"),
        Err(e) => warn!("Failed to record query for audit: {}", e),
    }
}
