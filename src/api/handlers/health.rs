/// Health check handler
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::HealthData;
use crate::api::types::MESSAGE_OK;

/// GET /healthcheck
pub async fn healthcheck(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let elapsed = state.started_at.elapsed();

    Json(ApiResponse::success(HealthData {
        uptime: elapsed.as_secs_f64(),
        responsetime: [elapsed.as_secs(), u64::from(elapsed.subsec_nanos())],
        message: MESSAGE_OK.to_string(),
        timestamp: Utc::now().timestamp_millis(),
    }))
}
