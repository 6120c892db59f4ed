//! JSON-RPC 2.0 message types
//!
//! Typed views over the JSON value tree for the three message flavors defined
//! by the specification (<https://www.jsonrpc.org/specification>):
//!
//! 1. **Request**: a call to a remote method that expects a response
//! 2. **Notification**: a call with no `id`, never answered
//! 3. **Response**: the result of processing a request (success or error)
//!
//! All types serialize to the exact wire shape via serde; the `jsonrpc` member
//! is always `"2.0"` when built through the constructors. For working with
//! messages that may be malformed, see the value-level checks in
//! [`crate::validate`] and the builders in [`crate::build`].

use crate::error::ErrorObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The protocol version string carried by every message.
pub const VERSION: &str = "2.0";

/// JSON-RPC 2.0 request identifier.
///
/// An id correlates a request with its response. The spec permits strings,
/// integers, and null; fractional numbers are rejected by
/// [`crate::validate::valid_id`]. Null ids are legal but only sensible on
/// error responses to input whose id could not be recovered.
///
/// Unsigned values above `i64::MAX` keep their own variant rather than
/// wrapping, so every integer id the wire can carry round-trips losslessly.
///
/// # Examples
///
/// ```rust
/// use jdx_core::Id;
///
/// let a: Id = "req-1".into();
/// let b: Id = 42i64.into();
/// assert_eq!(a.to_string(), "\"req-1\"");
/// assert_eq!(b.to_string(), "42");
/// assert_eq!(b.key(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier, e.g. `"req-7"` or a UUID
    String(String),
    /// Signed integer identifier
    Int(i64),
    /// Unsigned integer identifier beyond the signed range
    Uint(u64),
    /// Null identifier; used on error responses to malformed input
    Null,
}

impl Id {
    /// Canonical string key for correlation tables.
    ///
    /// Strings map to their content, every other variant to its canonical
    /// JSON rendering (`5` → `"5"`, null → `"null"`). Two ids are considered
    /// the same request iff their keys match.
    pub fn key(&self) -> String {
        match self {
            Id::String(s) => s.clone(),
            Id::Int(n) => n.to_string(),
            Id::Uint(n) => n.to_string(),
            Id::Null => "null".to_string(),
        }
    }

    /// Convert into the wire-level value.
    pub fn into_value(self) -> Value {
        match self {
            Id::String(s) => Value::String(s),
            Id::Int(n) => Value::from(n),
            Id::Uint(n) => Value::from(n),
            Id::Null => Value::Null,
        }
    }
}

impl fmt::Display for Id {
    /// JSON-like rendering: strings quoted, numbers bare, null as `null`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Int(n) => write!(f, "{}", n),
            Id::Uint(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Int(n)
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Uint(n)
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        id.into_value()
    }
}

/// Normalize a wire-level id into its correlation key.
///
/// Same contract as [`Id::key`] but directly on the decoded value: strings
/// map to their content, everything else to its canonical JSON dump. Used by
/// the pending-call and cancellation tables.
pub fn id_key(id: &Value) -> String {
    match id.as_str() {
        Some(s) => s.to_owned(),
        None => id.to_string(),
    }
}

/// JSON-RPC 2.0 request message.
///
/// A request must carry `jsonrpc: "2.0"`, a `method`, and an `id`; `params`
/// is optional and, when present, must be an array or object. A request with
/// `Id::Null` is still a request (it will be answered with a null id); a call
/// without any id at all is a [`Notification`].
///
/// # Examples
///
/// ```rust
/// use jdx_core::{Id, Request};
/// use serde_json::json;
///
/// let req = Request::new("subtract", Some(json!({"minuend": 42, "subtrahend": 23})), Id::Int(1));
/// assert_eq!(req.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version, always `"2.0"`
    pub jsonrpc: String,
    /// Name of the remote method to invoke
    pub method: String,
    /// Optional parameters; omitted from the wire when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Identifier correlating this request with its response
    pub id: Id,
}

impl Request {
    /// Create a new request; `jsonrpc` is set to `"2.0"`.
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Id) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 notification message.
///
/// Like a request but without an `id`; the receiver must never answer it,
/// even when handling fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Protocol version, always `"2.0"`
    pub jsonrpc: String,
    /// Name of the method or event being notified
    pub method: String,
    /// Optional parameters; omitted from the wire when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    /// Create a new notification; `jsonrpc` is set to `"2.0"`.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response message.
///
/// Exactly one of `result` and `error` is present; the factory constructors
/// enforce this by construction. The `id` echoes the request's id, or is
/// `Id::Null` when the request's id could not be recovered.
///
/// # Examples
///
/// ```rust
/// use jdx_core::{ErrorObject, Id, Response};
/// use serde_json::json;
///
/// let ok = Response::success(json!(8), Id::Int(1));
/// assert!(ok.is_success());
///
/// let err = Response::error(ErrorObject::method_not_found("mul"), Id::Int(2));
/// assert!(err.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version, always `"2.0"`
    pub jsonrpc: String,
    /// Result value, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    /// Identifier from the original request
    pub id: Id,
}

impl Response {
    /// Create a success response.
    pub fn success(result: Value, id: Id) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(error: ErrorObject, id: Id) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// True when `result` is present.
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// True when `error` is present.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Any JSON-RPC 2.0 message, as classified at decode time.
///
/// Batches keep their elements as raw values: each element is validated and
/// dispatched individually, and a malformed element must not poison its
/// siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// A request expecting a response
    Request(Request),
    /// A notification; never answered
    Notification(Notification),
    /// A response to an earlier request
    Response(Response),
    /// A batch of requests/notifications, elements kept raw
    Batch(Vec<Value>),
}

impl Message {
    /// True for the `Request` variant.
    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    /// True for the `Notification` variant.
    pub fn is_notification(&self) -> bool {
        matches!(self, Message::Notification(_))
    }

    /// True for the `Response` variant.
    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    /// True for the `Batch` variant.
    pub fn is_batch(&self) -> bool {
        matches!(self, Message::Batch(_))
    }
}
