//! Structural validation and shape classification
//!
//! These functions operate on raw decoded values, before any typed view
//! exists: the dispatcher has to produce a spec-correct error response for
//! input that never deserializes into [`crate::Request`] at all.
//!
//! [`validate_request`] / [`validate_response`] perform the full structural
//! checks and report the first violation as a human-readable reason. The
//! `is_*` predicates are the cheap variant-detection counterparts, usable on
//! pre-validated or partially-validated input.

use crate::types::VERSION;
use serde_json::Value;

/// True when the value is usable as a request id: null, string, or integer.
///
/// Fractional numbers are not valid ids.
pub fn valid_id(v: &Value) -> bool {
    v.is_null() || v.is_string() || v.is_i64() || v.is_u64()
}

fn version_ok(v: &Value) -> bool {
    v.get("jsonrpc").and_then(Value::as_str) == Some(VERSION)
}

/// Check that a value is structurally a valid request or notification.
///
/// Returns the first violated rule as the error reason.
pub fn validate_request(v: &Value) -> Result<(), String> {
    let Some(obj) = v.as_object() else {
        return Err("not an object".to_string());
    };
    if !version_ok(v) {
        return Err("jsonrpc != \"2.0\"".to_string());
    }
    if !obj.get("method").map(Value::is_string).unwrap_or(false) {
        return Err("method missing or not a string".to_string());
    }
    if let Some(id) = obj.get("id") {
        if !valid_id(id) {
            return Err("invalid id type".to_string());
        }
    }
    if let Some(params) = obj.get("params") {
        if !params.is_array() && !params.is_object() {
            return Err("params must be an array or object".to_string());
        }
    }
    Ok(())
}

/// Check that a value is structurally a valid response.
///
/// A response carries `jsonrpc: "2.0"`, a valid id, and exactly one of
/// `result` / `error`; an `error` member must be an object with an integer
/// `code` and a string `message`.
pub fn validate_response(v: &Value) -> Result<(), String> {
    let Some(obj) = v.as_object() else {
        return Err("not an object".to_string());
    };
    if !version_ok(v) {
        return Err("jsonrpc != \"2.0\"".to_string());
    }
    match obj.get("id") {
        Some(id) if valid_id(id) => {}
        _ => return Err("missing or invalid id".to_string()),
    }
    let has_result = obj.contains_key("result");
    let has_error = obj.contains_key("error");
    if has_result == has_error {
        return Err("must have exactly one of result or error".to_string());
    }
    if let Some(error) = obj.get("error") {
        let code_ok = error
            .get("code")
            .map(|c| c.is_i64() || c.is_u64())
            .unwrap_or(false);
        let message_ok = error.get("message").map(Value::is_string).unwrap_or(false);
        if !error.is_object() || !code_ok || !message_ok {
            return Err("invalid error object".to_string());
        }
    }
    Ok(())
}

/// Cheap shape check: does this look like a request (or notification)?
pub fn is_request(v: &Value) -> bool {
    v.is_object()
        && version_ok(v)
        && v.get("method").is_some()
        && v.get("result").is_none()
        && v.get("error").is_none()
}

/// Cheap shape check: a request without an id.
pub fn is_notification(v: &Value) -> bool {
    is_request(v) && v.get("id").is_none()
}

/// Cheap shape check: does this look like a response?
pub fn is_response(v: &Value) -> bool {
    v.is_object()
        && version_ok(v)
        && v.get("id").is_some()
        && (v.get("result").is_some() ^ v.get("error").is_some())
}
