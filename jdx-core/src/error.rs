//! Error types for jdx
//!
//! Two layers, as in every JSON-RPC implementation:
//!
//! - [`Error`]: the application-level error enum used throughout the crates
//!   (built with `thiserror`)
//! - [`ErrorObject`]: the wire-format error object that appears in a
//!   response's `error` member
//!
//! The standard JSON-RPC 2.0 error codes live in [`codes`], together with the
//! `-32800` request-cancelled convention used by the endpoint layer and the
//! `-32000..=-32099` range reserved for application-defined server errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error as ThisError;

/// Result type used throughout the jdx crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Standard JSON-RPC 2.0 error codes, plus the cancellation convention.
pub mod codes {
    /// Invalid JSON was received (`-32700`); emitted by the text codec.
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON is not a valid request object, or the batch was empty (`-32600`).
    pub const INVALID_REQUEST: i64 = -32600;
    /// No handler is registered for the method (`-32601`).
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// The params could not be decoded into the handler's input type (`-32602`).
    pub const INVALID_PARAMS: i64 = -32602;
    /// The handler failed with a non-domain error (`-32603`).
    pub const INTERNAL_ERROR: i64 = -32603;
    /// A handler observed cancellation and aborted (`-32800`).
    pub const REQUEST_CANCELLED: i64 = -32800;
    /// Lower bound of the range reserved for application server errors.
    pub const SERVER_ERROR_MIN: i64 = -32099;
    /// Upper bound of the range reserved for application server errors.
    pub const SERVER_ERROR_MAX: i64 = -32000;
}

/// Application-level error for jdx operations.
///
/// Handlers return this from their `Result`; the dispatcher maps it onto the
/// wire. A [`Error::Rpc`] carries an [`ErrorObject`] that is propagated into
/// the response verbatim (domain errors); every other variant surfaces as
/// internal-error with the textual description in `data.what`.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// A wire-format error to be returned to the peer as-is.
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] ErrorObject),

    /// Conversion between Rust types and JSON failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An unexpected fault inside a handler.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON-RPC 2.0 error object, the exact wire format of a response's `error`
/// member.
///
/// `code` and `message` are required; `data` may carry any additional
/// context. The factory constructors cover the standard codes; use
/// [`ErrorObject::new`] with a code in `-32000..=-32099` for
/// application-defined server errors.
///
/// # Examples
///
/// ```rust
/// use jdx_core::{codes, ErrorObject};
/// use serde_json::json;
///
/// let e = ErrorObject::method_not_found("calculate");
/// assert_eq!(e.code, codes::METHOD_NOT_FOUND);
///
/// let domain = ErrorObject::with_data(-32000, "Division by zero", json!({"divisor": 0}));
/// assert_eq!(domain.code, -32000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code
    pub code: i64,
    /// Short human-readable description
    pub message: String,
    /// Optional structured context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create an error with a code and message and no data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error carrying additional data.
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Attach a `{"what": …}` diagnostic to an existing error.
    ///
    /// This is the shape the dispatcher and typed adapter use for short
    /// failure descriptions; no stack traces are ever exposed.
    pub fn with_what(mut self, what: impl Into<String>) -> Self {
        self.data = Some(json!({ "what": what.into() }));
        self
    }

    /// Parse error (`-32700`): the text was not valid JSON.
    pub fn parse_error() -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error")
    }

    /// Invalid request (`-32600`) with a specific reason.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, reason)
    }

    /// Method not found (`-32601`) for the named method.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method.into()),
        )
    }

    /// Invalid params (`-32602`) with a specific reason.
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, reason)
    }

    /// Internal error (`-32603`) with a specific message.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }

    /// Request cancelled (`-32800`): a handler aborted after observing its
    /// cancellation flag.
    pub fn request_cancelled() -> Self {
        Self::new(codes::REQUEST_CANCELLED, "Request cancelled")
    }

    /// Render as the wire-level value (`{"code": …, "message": …, "data"?: …}`).
    pub fn to_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("code".to_string(), Value::from(self.code));
        obj.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            obj.insert("data".to_string(), data.clone());
        }
        Value::Object(obj)
    }
}

impl std::fmt::Display for ErrorObject {
    /// Formats as `[code] message`, e.g. `[-32601] Method not found: mul`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
