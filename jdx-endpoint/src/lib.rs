//! Bidirectional JSON-RPC 2.0 endpoint layer for jdx
//!
//! This crate builds the operational layer on top of `jdx-core`'s protocol
//! model:
//!
//! - **Dispatcher**: handler registry with spec-correct single- and
//!   batch-message dispatch
//! - **Typed adapter**: lifts functions over domain types to raw handlers
//!   via serde
//! - **Call context**: ambient per-handler access to the request id,
//!   progress sink, and cancellation poll
//! - **Endpoint**: client and server on one object, with request/response
//!   correlation, `$/cancelRequest`, `$/progress`, and the `initialize`
//!   handshake
//!
//! No I/O happens here. The embedder owns the transport, hands the endpoint
//! a send function, and feeds decoded inbound values to
//! [`Endpoint::receive`]. Everything runs synchronously on the calling
//! thread; the crate commits to single-threaded use and its types are
//! intentionally neither `Send` nor `Sync`.
//!
//! # Quick start
//!
//! ```rust
//! use jdx_endpoint::{is_cancelled, report_progress, Endpoint};
//! use jdx_core::ErrorObject;
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let server = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
//!
//! server.register("count", |params| {
//!     let upto = params["upto"].as_u64().unwrap_or(0);
//!     for step in 0..upto {
//!         if is_cancelled() {
//!             return Err(ErrorObject::request_cancelled().into());
//!         }
//!         report_progress(json!({"step": step}));
//!     }
//!     Ok(json!({"counted": upto}))
//! });
//!
//! server.receive(&json!({"jsonrpc": "2.0", "method": "count", "params": {"upto": 2}, "id": 1}));
//! // Two progress notifications, then the response.
//! assert_eq!(outbox.borrow().len(), 3);
//! ```

pub mod context;
pub mod dispatch;
pub mod endpoint;
pub mod typed;

pub use context::{
    current_context, is_cancelled, report_progress, CallContext, CancelFlag, ContextScope,
};
pub use dispatch::{Dispatcher, HandlerFn};
pub use endpoint::{Endpoint, SendFn};
pub use typed::{from_no_params_fn, from_typed_fn, typed_result, unwrap_params, wrap_params};
