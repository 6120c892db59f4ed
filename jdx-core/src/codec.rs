//! Text codec for JSON-RPC messages
//!
//! Everything in jdx consumes and produces decoded value trees; this module
//! is the adapter between those trees and UTF-8 JSON text. Transports call
//! [`decode_value`] on inbound frames and [`encode`] on outbound ones;
//! [`decode`] additionally classifies the message and detects batches.
//!
//! Error mapping follows the spec: text that is not valid JSON maps to parse
//! error (`-32700`), an empty batch to invalid request (`-32600`).

use crate::error::{Error, ErrorObject, Result};
use crate::types::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encode any serializable message to a JSON string.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a JSON string into a raw value tree.
///
/// This is the entry point for transports feeding an endpoint: the endpoint's
/// `receive` takes the decoded value. Invalid JSON maps to a parse error, for
/// the transport to answer with `make_error(null, …)`.
pub fn decode_value(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|_| Error::Rpc(ErrorObject::parse_error()))
}

/// Decode a JSON string into a classified [`Message`].
///
/// Arrays are returned as [`Message::Batch`] with the elements kept raw, so a
/// malformed element can be answered individually instead of failing the
/// whole batch. An empty batch is rejected here with invalid-request.
pub fn decode(text: &str) -> Result<Message> {
    match decode_value(text)? {
        Value::Array(elements) => {
            if elements.is_empty() {
                return Err(Error::Rpc(ErrorObject::invalid_request(
                    "batch cannot be empty",
                )));
            }
            Ok(Message::Batch(elements))
        }
        single => {
            serde_json::from_value(single).map_err(|_| Error::Rpc(ErrorObject::parse_error()))
        }
    }
}

/// Decode a JSON string directly into a specific type.
///
/// Use this when the expected shape is already known; mismatches surface as
/// [`Error::Serialization`] rather than a wire-format error.
pub fn decode_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Serialization(e.to_string()))
}
