//! Core JSON-RPC 2.0 types and codec for jdx
//!
//! This crate provides the protocol model shared by everything in jdx:
//!
//! - **Types**: typed views over the wire format ([`Request`],
//!   [`Notification`], [`Response`], [`Id`], [`Message`])
//! - **Builders**: value-level constructors for well-formed messages
//!   ([`make_request`], [`make_result`], [`make_error`], …)
//! - **Validation**: structural checks and shape classification on raw
//!   decoded values ([`validate_request`], [`is_response`], …)
//! - **Errors**: the wire-format [`ErrorObject`] and the application-level
//!   [`Error`] enum
//! - **Codec**: UTF-8 JSON text encode/decode with spec-correct error
//!   mapping
//!
//! The crate is transport-agnostic: it never opens sockets or reads streams.
//! Callers decode text with [`codec`], hand values to the dispatch/endpoint
//! layer in `jdx-endpoint`, and write whatever that layer emits back to their
//! transport.
//!
//! # Example
//!
//! ```rust
//! use jdx_core::{codec, make_request, validate_request};
//! use serde_json::json;
//!
//! let req = make_request(json!(1), "add", json!([5, 3]));
//! assert_eq!(validate_request(&req), Ok(()));
//!
//! let decoded = codec::decode(r#"{"jsonrpc":"2.0","method":"add","params":[5,3],"id":1}"#)?;
//! assert!(decoded.is_request());
//! # Ok::<(), jdx_core::Error>(())
//! ```

pub mod build;
pub mod codec;
pub mod error;
pub mod types;
pub mod validate;

pub use build::{make_error, make_notification, make_request, make_result};
pub use error::{codes, Error, ErrorObject, Result};
pub use types::{id_key, Id, Message, Notification, Request, Response, VERSION};
pub use validate::{
    is_notification, is_request, is_response, valid_id, validate_request, validate_response,
};
