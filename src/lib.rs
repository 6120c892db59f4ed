//! jdx: JSON-RPC 2.0 duplex endpoint toolkit
//!
//! This is the convenience crate that re-exports the jdx sub-crates. Use it
//! for a single dependency covering the whole surface.
//!
//! # Architecture
//!
//! - **jdx-core**: protocol model with typed message views, value-level
//!   builders, structural validation, error objects, text codec
//! - **jdx-endpoint**: the operational layer with the dispatcher, typed adapter,
//!   ambient call context, and the bidirectional [`Endpoint`] with
//!   cancellation, progress, and the initialize handshake
//!
//! The library is transport-agnostic and single-threaded by contract: the
//! embedder supplies a send function, feeds decoded inbound values to
//! [`Endpoint::receive`], and keeps each endpoint on its creating thread.
//!
//! # Quick start
//!
//! ```rust
//! use jdx::Endpoint;
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // Wire two endpoints back to back through in-memory queues.
//! let a_out = Rc::new(RefCell::new(Vec::new()));
//! let b_out = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&a_out);
//! let client = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
//! let sink = Rc::clone(&b_out);
//! let server = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
//!
//! server.register("multiply", |params| {
//!     Ok(json!(params[0].as_i64().unwrap_or(0) * params[1].as_i64().unwrap_or(0)))
//! });
//!
//! let product = Rc::new(RefCell::new(None));
//! let captured = Rc::clone(&product);
//! client.send_request(
//!     "multiply",
//!     json!([6, 7]),
//!     move |result| *captured.borrow_mut() = Some(result.clone()),
//!     |error| panic!("unexpected error: {error}"),
//! );
//!
//! // Bridge the queues by hand: request over, response back.
//! for msg in a_out.borrow_mut().drain(..) {
//!     server.receive(&msg);
//! }
//! for msg in b_out.borrow_mut().drain(..) {
//!     client.receive(&msg);
//! }
//!
//! assert_eq!(*product.borrow(), Some(json!(42)));
//! ```

pub use jdx_core as core;
pub use jdx_endpoint as endpoint;

pub use jdx_core::{
    codes, make_error, make_notification, make_request, make_result, Error, ErrorObject, Id,
    Message, Notification, Request, Response, Result,
};
pub use jdx_endpoint::{
    current_context, is_cancelled, report_progress, CallContext, Dispatcher, Endpoint,
};
