//! API request and response types

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Message returned when the `x-api-key` check fails
pub const INVALID_API_KEY: &str = "Invalid API key";

/// Message reported by the health check
pub const MESSAGE_OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// A request that was accepted but failed while being processed
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// A request turned away before processing
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthData {
    /// Seconds since the server started
    pub uptime: f64,
    /// `[seconds, nanoseconds]` on the monotonic clock since the server started
    pub responsetime: [u64; 2],
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Generate-query request body after validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateQueryRequest {
    pub query: Option<String>,
}

/// 422 body listing each rejected field with its message
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<HashMap<String, String>>,
}

impl ValidationErrorResponse {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            errors: vec![HashMap::from([(field.to_string(), message.to_string())])],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(ApiResponse::success("answer")).unwrap();
        assert_eq!(value, json!({"status": "success", "data": "answer"}));
    }

    #[test]
    fn test_failed_shape() {
        let value = serde_json::to_value(ApiResponse::<String>::failed("boom")).unwrap();
        assert_eq!(value, json!({"status": "failed", "error": "boom"}));
    }

    #[test]
    fn test_rejected_shape() {
        let value = serde_json::to_value(ApiResponse::<()>::rejected(INVALID_API_KEY)).unwrap();
        assert_eq!(value, json!({"status": "failed", "message": "Invalid API key"}));
    }

    #[test]
    fn test_validation_error_shape() {
        let value =
            serde_json::to_value(ValidationErrorResponse::single("query", "query should be a string"))
                .unwrap();
        assert_eq!(value, json!({"errors": [{"query": "query should be a string"}]}));
    }
}
