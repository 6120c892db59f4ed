//! Value-level message builders
//!
//! Construct well-formed wire messages directly as values, without going
//! through the typed structs. This is what the dispatcher and endpoint use on
//! their hot paths: building a response must not be able to fail.
//!
//! Conventions:
//!
//! - `make_request` omits the `id` member when given a null id; that is how a
//!   notification is built. `make_result` / `make_error` always write `id`,
//!   including an explicit null, which responses to malformed input require.
//! - Null params are omitted.
//!
//! # Examples
//!
//! ```rust
//! use jdx_core::{make_request, validate_request};
//! use serde_json::json;
//!
//! let req = make_request(json!(1), "add", json!([5, 3]));
//! assert_eq!(validate_request(&req), Ok(()));
//! ```

use crate::error::ErrorObject;
use crate::types::VERSION;
use serde_json::{Map, Value};

/// Build a request, or a notification when `id` is null.
pub fn make_request(id: Value, method: &str, params: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("jsonrpc".to_string(), Value::String(VERSION.to_string()));
    obj.insert("method".to_string(), Value::String(method.to_string()));
    if !params.is_null() {
        obj.insert("params".to_string(), params);
    }
    if !id.is_null() {
        obj.insert("id".to_string(), id);
    }
    Value::Object(obj)
}

/// Build a notification (a request without an id).
pub fn make_notification(method: &str, params: Value) -> Value {
    make_request(Value::Null, method, params)
}

/// Build a success response for `id`.
pub fn make_result(id: Value, result: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("jsonrpc".to_string(), Value::String(VERSION.to_string()));
    obj.insert("id".to_string(), id);
    obj.insert("result".to_string(), result);
    Value::Object(obj)
}

/// Build an error response for `id`; `id` may be null for responses to
/// malformed input.
pub fn make_error(id: Value, error: &ErrorObject) -> Value {
    let mut obj = Map::new();
    obj.insert("jsonrpc".to_string(), Value::String(VERSION.to_string()));
    obj.insert("id".to_string(), id);
    obj.insert("error".to_string(), error.to_value());
    Value::Object(obj)
}
