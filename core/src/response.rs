//! Response interpretation.
//!
//! The service signals success and failure through substrings of the raw
//! body rather than status codes or structured errors. These checks apply the
//! literal markers to the body text exactly as received.

use serde_json::Value;

use crate::codec::JsonCodec;
use crate::error::ApiError;
use crate::http::HttpResponse;

/// Present in the body of a rejected login.
pub const LOGIN_ERROR: &str = "LOGIN_ERROR";
/// Present in every account payload that carries a session token.
pub const TOKEN_FIELD: &str = "api_token";
/// Present in every created or updated project or item.
pub const ID_MARKER: &str = "id";
/// Returned by `updateProject` for an unknown project.
pub const PROJECT_NOT_FOUND: &str = "ERROR_PROJECT_NOT_FOUND";

/// Map a non-2xx status to `ApiError::Status`, carrying the status line.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        reason: response.reason.clone(),
    })
}

/// Fail with the raw body unless it contains `marker`.
pub fn require_marker(body: &str, marker: &str) -> Result<(), ApiError> {
    if body.contains(marker) {
        Ok(())
    } else {
        Err(ApiError::Remote(body.to_string()))
    }
}

/// Fail with the raw body if it contains `marker`.
pub fn reject_marker(body: &str, marker: &str) -> Result<(), ApiError> {
    if body.contains(marker) {
        Err(ApiError::Remote(body.to_string()))
    } else {
        Ok(())
    }
}

/// Answer of the boolean endpoints: any case-insensitive `ok` in the body.
pub fn is_ok(body: &str) -> bool {
    body.to_ascii_lowercase().contains("ok")
}

pub fn decode(codec: &dyn JsonCodec, body: &str) -> Result<Value, ApiError> {
    codec.decode(body).map_err(ApiError::Decode)
}

/// A decoded array as-is; any other value as a one-element sequence.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        other => vec![other],
    }
}

pub fn first(values: Vec<Value>) -> Result<Value, ApiError> {
    values.into_iter().next().ok_or(ApiError::EmptyResponse)
}

/// The session token of a decoded account payload. Fails with the raw `body`
/// the payload was decoded from.
pub fn extract_token(payload: &Value, body: &str) -> Result<String, ApiError> {
    payload
        .get(TOKEN_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Remote(body.to_string()))
}
