//! Typed adapter between domain types and wire values
//!
//! Lifts functions over strongly-typed inputs/outputs to the raw handler
//! signature, with serde doing the conversion at the seam.
//!
//! Wrapping rules (outbound params): an encoding that is already an array or
//! object goes out as-is; anything else is wrapped into a one-element array,
//! because JSON-RPC params must be structured. Unwrapping mirrors this: a
//! one-element array unwraps to its sole element before decoding. Decode
//! failures surface as invalid-params (`-32602`) with the serde message in
//! `data.what`.
//!
//! # Examples
//!
//! ```rust
//! use jdx_endpoint::{from_typed_fn, Dispatcher};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct AddParams { a: i64, b: i64 }
//!
//! #[derive(Serialize)]
//! struct AddResult { sum: i64 }
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register("add", from_typed_fn(|p: AddParams| {
//!     Ok(AddResult { sum: p.a + p.b })
//! }));
//!
//! let req = json!({"jsonrpc": "2.0", "method": "add", "params": {"a": 5, "b": 3}, "id": 1});
//! assert_eq!(dispatcher.handle(&req).unwrap()["result"], json!({"sum": 8}));
//! ```

use jdx_core::{Error, ErrorObject, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Encode outbound params, wrapping non-structured values into a
/// one-element array.
pub fn wrap_params<P: Serialize>(params: &P) -> Result<Value> {
    let encoded =
        serde_json::to_value(params).map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(match encoded {
        Value::Array(_) | Value::Object(_) => encoded,
        other => json!([other]),
    })
}

/// Decode an inbound params (or result) value into a domain type.
///
/// A one-element array unwraps to its sole element first; failures map to
/// invalid-params with the decoder's message in `data.what`.
pub fn unwrap_params<P: DeserializeOwned>(value: &Value) -> Result<P> {
    let source = match value.as_array() {
        Some(items) if items.len() == 1 => &items[0],
        _ => value,
    };
    serde_json::from_value(source.clone()).map_err(|e| {
        Error::Rpc(ErrorObject::invalid_params("Invalid params").with_what(e.to_string()))
    })
}

/// Lift a typed function into a raw handler.
///
/// Params decode per [`unwrap_params`]; the result encodes with serde (a
/// unit result becomes JSON null).
pub fn from_typed_fn<P, R, F>(f: F) -> impl Fn(&Value) -> Result<Value>
where
    P: DeserializeOwned + 'static,
    R: Serialize + 'static,
    F: Fn(P) -> Result<R> + 'static,
{
    move |params| {
        let typed = unwrap_params::<P>(params)?;
        let result = f(typed)?;
        serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Lift a parameterless function into a raw handler; inbound params are
/// ignored.
pub fn from_no_params_fn<R, F>(f: F) -> impl Fn(&Value) -> Result<Value>
where
    R: Serialize + 'static,
    F: Fn() -> Result<R> + 'static,
{
    move |_params| {
        let result = f()?;
        serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Wrap a typed result callback for the client side.
///
/// The inbound result decodes per [`unwrap_params`]; a result that does not
/// decode is logged and dropped rather than delivered mis-typed.
pub fn typed_result<R, F>(callback: F) -> impl FnOnce(&Value)
where
    R: DeserializeOwned + 'static,
    F: FnOnce(R) + 'static,
{
    move |value| match unwrap_params::<R>(value) {
        Ok(typed) => callback(typed),
        Err(e) => tracing::warn!(error = %e, "dropping response result that failed to decode"),
    }
}
