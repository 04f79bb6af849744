//! Request body validation
//!
//! Optional fields use falsy-skip semantics: `null`, `false`, `0` and `""` count as absent.

use serde_json::Value;

use crate::api::types::GenerateQueryRequest;
use crate::api::types::ValidationErrorResponse;

pub const BODY_NOT_OBJECT: &str = "request body must be a JSON object";
pub const QUERY_NOT_STRING: &str = "query should be a string";

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Validate a raw generate-query body
///
/// An empty body is treated as `{}`.
pub fn validate_generate_query(body: &[u8]) -> Result<GenerateQueryRequest, ValidationErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateQueryRequest::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ValidationErrorResponse::single("body", BODY_NOT_OBJECT))?;
    let Value::Object(fields) = value else {
        return Err(ValidationErrorResponse::single("body", BODY_NOT_OBJECT));
    };

    let query = match fields.get("query") {
        None => None,
        Some(value) if is_falsy(value) => None,
        Some(Value::String(query)) => Some(query.clone()),
        Some(_) => return Err(ValidationErrorResponse::single("query", QUERY_NOT_STRING)),
    };

    Ok(GenerateQueryRequest { query })
}
