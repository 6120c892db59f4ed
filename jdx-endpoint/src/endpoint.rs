//! Bidirectional JSON-RPC endpoint
//!
//! An [`Endpoint`] is client and server on a single object: it originates
//! requests with id/callback correlation, serves inbound requests through a
//! [`Dispatcher`], and layers on the operational conventions LSP and MCP
//! built on top of JSON-RPC:
//!
//! - `$/cancelRequest`: cooperative, poll-based cancellation of in-flight
//!   requests, keyed by the server-side request id
//! - `$/progress`: incremental progress streams identified by opaque tokens
//! - `initialize`: one-shot capability exchange
//!
//! The endpoint is transport-agnostic. It takes a send function at
//! construction and calls it for every outbound message; the embedder feeds
//! decoded inbound values to [`Endpoint::receive`]. Handlers execute
//! synchronously inside `receive`, on the caller's thread.
//!
//! Single-threaded by contract: shared state is `Rc`-based, the ambient call
//! context lives in a thread-local slot, and an endpoint must stay on the
//! thread that created it. Embedders needing parallelism run one endpoint
//! per thread and bridge with their own queues.
//!
//! # Examples
//!
//! ```rust
//! use jdx_endpoint::Endpoint;
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let endpoint = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
//!
//! endpoint.register("add", |params| {
//!     Ok(json!(params[0].as_i64().unwrap_or(0) + params[1].as_i64().unwrap_or(0)))
//! });
//!
//! endpoint.receive(&json!({"jsonrpc": "2.0", "method": "add", "params": [5, 3], "id": 1}));
//! assert_eq!(outbox.borrow()[0]["result"], json!(8));
//! ```

use crate::context::{CallContext, CancelFlag};
use crate::dispatch::Dispatcher;
use crate::typed;
use jdx_core::{
    id_key, is_response, make_error, make_notification, make_request, Error, ErrorObject, Result,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// The outbound message sink supplied at construction.
pub type SendFn = Box<dyn Fn(Value)>;

type ResponseCallback = Box<dyn FnOnce(&Value)>;
type ProgressHandler = Rc<dyn Fn(&Value)>;

/// One outstanding outbound request: taken exactly once when its response
/// arrives, dropped uninvoked on endpoint teardown.
struct PendingCall {
    on_result: ResponseCallback,
    on_error: ResponseCallback,
}

struct Shared {
    send: SendFn,
    dispatcher: Dispatcher,
    /// Outbound requests awaiting a response, keyed by normalized id.
    pending: RefCell<HashMap<String, PendingCall>>,
    /// Cancellation flags for in-flight inbound requests, keyed by
    /// normalized id. A flag appears at cancel arrival or handler start,
    /// whichever comes first, and is dropped after the response goes out.
    cancellations: RefCell<HashMap<String, CancelFlag>>,
    /// Client-side progress sinks, keyed by token.
    progress_handlers: RefCell<HashMap<String, ProgressHandler>>,
    /// Id of the inbound message currently being dispatched.
    current_id: RefCell<Option<Value>>,
    capabilities: RefCell<Value>,
    initialized: Cell<bool>,
    counter: Cell<u64>,
}

impl Shared {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{prefix}{n}")
    }

    fn track(
        &self,
        id: &str,
        on_result: impl FnOnce(&Value) + 'static,
        on_error: impl FnOnce(&Value) + 'static,
    ) {
        self.pending.borrow_mut().insert(
            id.to_owned(),
            PendingCall {
                on_result: Box::new(on_result),
                on_error: Box::new(on_error),
            },
        );
    }

    fn emit_progress(&self, token: &str, value: Value) {
        (self.send)(make_notification(
            "$/progress",
            json!({ "token": token, "value": value }),
        ));
    }

    fn drop_cancellation(&self, message: &Value) {
        if let Some(id) = message.get("id") {
            self.cancellations.borrow_mut().remove(&id_key(id));
        }
    }
}

/// Bidirectional JSON-RPC 2.0 participant over a caller-supplied sink.
pub struct Endpoint {
    shared: Rc<Shared>,
}

impl Endpoint {
    /// Create an endpoint that emits every outbound message through `send`.
    ///
    /// The built-in `$/cancelRequest`, `$/progress` and `initialize` methods
    /// are registered up front; everything else is added via
    /// [`Endpoint::register`].
    pub fn new(send: impl Fn(Value) + 'static) -> Self {
        let endpoint = Endpoint {
            shared: Rc::new(Shared {
                send: Box::new(send),
                dispatcher: Dispatcher::new(),
                pending: RefCell::new(HashMap::new()),
                cancellations: RefCell::new(HashMap::new()),
                progress_handlers: RefCell::new(HashMap::new()),
                current_id: RefCell::new(None),
                capabilities: RefCell::new(json!({})),
                initialized: Cell::new(false),
                counter: Cell::new(0),
            }),
        };
        endpoint.register_builtins();
        endpoint
    }

    // Built-ins bypass the context wrapper; they hold Weak references so the
    // dispatcher's handler map does not keep the endpoint alive.
    fn register_builtins(&self) {
        let weak = Rc::downgrade(&self.shared);
        self.shared.dispatcher.register("$/cancelRequest", move |params| {
            let Some(shared) = weak.upgrade() else {
                return Ok(Value::Null);
            };
            if let Some(id) = params.get("id") {
                shared
                    .cancellations
                    .borrow_mut()
                    .entry(id_key(id))
                    .or_default()
                    .set();
            }
            Ok(Value::Null)
        });

        let weak = Rc::downgrade(&self.shared);
        self.shared.dispatcher.register("$/progress", move |params| {
            let Some(shared) = weak.upgrade() else {
                return Ok(Value::Null);
            };
            let token = params
                .get("token")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty());
            if let Some(token) = token {
                let handler = shared.progress_handlers.borrow().get(token).cloned();
                if let Some(handler) = handler {
                    handler(params.get("value").unwrap_or(&Value::Null));
                }
            }
            Ok(Value::Null)
        });

        let weak = Rc::downgrade(&self.shared);
        self.shared.dispatcher.register("initialize", move |_params| {
            let Some(shared) = weak.upgrade() else {
                return Ok(Value::Null);
            };
            if shared.initialized.get() {
                return Err(Error::Rpc(ErrorObject::invalid_request(
                    "already initialized",
                )));
            }
            shared.initialized.set(true);
            tracing::debug!("endpoint initialized");
            Ok(json!({ "capabilities": shared.capabilities.borrow().clone() }))
        });
    }

    /// Register a handler for `method`; re-registration replaces.
    ///
    /// The handler runs with an ambient [`CallContext`] published for its
    /// dynamic extent: [`crate::is_cancelled`] polls this request's
    /// cancellation flag, and [`crate::report_progress`] emits `$/progress`
    /// notifications bound to `params.progressToken` when the params carry
    /// one, or to the request's id-key otherwise.
    pub fn register(
        &self,
        method: impl Into<String>,
        handler: impl Fn(&Value) -> Result<Value> + 'static,
    ) {
        let weak = Rc::downgrade(&self.shared);
        self.shared.dispatcher.register(method, move |params| {
            let Some(shared) = weak.upgrade() else {
                return handler(params);
            };
            let id = shared
                .current_id
                .borrow()
                .clone()
                .unwrap_or(Value::Null);
            let key = id_key(&id);
            let flag = shared
                .cancellations
                .borrow_mut()
                .entry(key.clone())
                .or_default()
                .clone();
            let token = params
                .get("progressToken")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or(key);
            let progress_target = Weak::clone(&weak);
            let ctx = CallContext::new(id, flag, move |value| {
                if let Some(shared) = progress_target.upgrade() {
                    shared.emit_progress(&token, value);
                }
            });
            let _scope = ctx.enter();
            handler(params)
        });
    }

    /// Register a handler over typed params and result.
    pub fn register_typed<P, R>(
        &self,
        method: impl Into<String>,
        handler: impl Fn(P) -> Result<R> + 'static,
    ) where
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        self.register(method, typed::from_typed_fn(handler));
    }

    /// Register a handler that takes no parameters.
    pub fn register_no_params<R>(
        &self,
        method: impl Into<String>,
        handler: impl Fn() -> Result<R> + 'static,
    ) where
        R: Serialize + 'static,
    {
        self.register(method, typed::from_no_params_fn(handler));
    }

    /// Send a request with a fresh `req-<n>` id; returns the id.
    ///
    /// Exactly one of the callbacks fires when the matching response
    /// arrives; both are dropped uninvoked if the endpoint is torn down
    /// first.
    pub fn send_request(
        &self,
        method: &str,
        params: Value,
        on_result: impl FnOnce(&Value) + 'static,
        on_error: impl FnOnce(&Value) + 'static,
    ) -> String {
        let id = self.shared.next_id("req-");
        self.shared.track(&id, on_result, on_error);
        (self.shared.send)(make_request(Value::String(id.clone()), method, params));
        id
    }

    /// Send a request under a caller-chosen id.
    pub fn send_request_with_id(
        &self,
        id: &str,
        method: &str,
        params: Value,
        on_result: impl FnOnce(&Value) + 'static,
        on_error: impl FnOnce(&Value) + 'static,
    ) {
        self.shared.track(id, on_result, on_error);
        (self.shared.send)(make_request(Value::String(id.to_owned()), method, params));
    }

    /// Send a request with typed params and a typed result callback.
    pub fn send_request_typed<P, R>(
        &self,
        method: &str,
        params: &P,
        on_result: impl FnOnce(R) + 'static,
        on_error: impl FnOnce(&Value) + 'static,
    ) -> Result<String>
    where
        P: Serialize,
        R: DeserializeOwned + 'static,
    {
        let params = typed::wrap_params(params)?;
        Ok(self.send_request(method, params, typed::typed_result(on_result), on_error))
    }

    /// Send a notification (no id, never answered).
    pub fn send_notification(&self, method: &str, params: Value) {
        (self.shared.send)(make_notification(method, params));
    }

    /// Send a notification with typed params.
    pub fn send_notification_typed<P: Serialize>(&self, method: &str, params: &P) -> Result<()> {
        self.send_notification(method, typed::wrap_params(params)?);
        Ok(())
    }

    /// Ask the peer to cancel the request it is serving under `id`.
    pub fn cancel(&self, id: Value) {
        (self.shared.send)(make_notification("$/cancelRequest", json!({ "id": id })));
    }

    /// Mint a fresh `tok-<n>` progress token.
    pub fn create_progress_token(&self) -> String {
        self.shared.next_id("tok-")
    }

    /// Route inbound `$/progress` notifications carrying `token` to
    /// `handler`.
    pub fn on_progress(&self, token: impl Into<String>, handler: impl Fn(&Value) + 'static) {
        self.shared
            .progress_handlers
            .borrow_mut()
            .insert(token.into(), Rc::new(handler));
    }

    /// Emit a `$/progress` notification for `token` directly.
    pub fn send_progress(&self, token: &str, value: Value) {
        self.shared.emit_progress(token, value);
    }

    /// Send the `initialize` request.
    pub fn initialize(
        &self,
        params: Value,
        on_result: impl FnOnce(&Value) + 'static,
        on_error: impl FnOnce(&Value) + 'static,
    ) -> String {
        self.send_request("initialize", params, on_result, on_error)
    }

    /// Set the capabilities surfaced by the `initialize` response. Call
    /// before the peer initializes.
    pub fn set_server_capabilities(&self, capabilities: Value) {
        *self.shared.capabilities.borrow_mut() = capabilities;
    }

    /// True once this endpoint has serviced an `initialize` request.
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.get()
    }

    /// Number of outbound requests still awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.shared.pending.borrow().len()
    }

    /// True while the outbound request `id` awaits its response.
    pub fn has_pending(&self, id: &str) -> bool {
        self.shared.pending.borrow().contains_key(id)
    }

    /// Feed one decoded inbound message: a request, notification, response,
    /// or batch.
    ///
    /// Requests and notifications dispatch synchronously; any progress a
    /// handler reports is emitted before its response. Responses resolve the
    /// matching pending call, firing its callback exactly once; responses
    /// with unknown or already-resolved ids are dropped. Batches answer with
    /// one response array preserving input order (or nothing when every
    /// element was a notification); an empty batch is answered with a single
    /// invalid-request error.
    pub fn receive(&self, message: &Value) {
        if let Some(batch) = message.as_array() {
            self.receive_batch(batch);
            return;
        }
        if is_response(message) {
            self.resolve_pending(message);
            return;
        }
        let response = self.dispatch_with_context(message);
        if let Some(response) = response {
            (self.shared.send)(response);
            self.shared.drop_cancellation(message);
        }
    }

    fn receive_batch(&self, batch: &[Value]) {
        if batch.is_empty() {
            (self.shared.send)(make_error(
                Value::Null,
                &ErrorObject::invalid_request("empty batch"),
            ));
            return;
        }
        let mut responses = Vec::with_capacity(batch.len());
        for element in batch {
            if let Some(response) = self.dispatch_with_context(element) {
                responses.push(response);
            }
            self.shared.drop_cancellation(element);
        }
        tracing::debug!(
            requests = batch.len(),
            responses = responses.len(),
            "batch received"
        );
        if !responses.is_empty() {
            (self.shared.send)(Value::Array(responses));
        }
    }

    fn dispatch_with_context(&self, message: &Value) -> Option<Value> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        *self.shared.current_id.borrow_mut() = Some(id);
        let response = self.shared.dispatcher.handle_single(message);
        *self.shared.current_id.borrow_mut() = None;
        response
    }

    fn resolve_pending(&self, response: &Value) {
        let Some(id) = response.get("id") else {
            return;
        };
        let call = self.shared.pending.borrow_mut().remove(&id_key(id));
        let Some(call) = call else {
            tracing::debug!(id = %id, "dropping response for unknown or resolved id");
            return;
        };
        if let Some(result) = response.get("result") {
            (call.on_result)(result);
        } else if let Some(error) = response.get("error") {
            (call.on_error)(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collecting_endpoint() -> (Endpoint, Rc<RefCell<Vec<Value>>>) {
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        let endpoint = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
        (endpoint, outbox)
    }

    #[test]
    fn request_ids_are_monotonic_and_returned() {
        let (endpoint, outbox) = collecting_endpoint();
        let id1 = endpoint.send_request("a", json!(null), |_| {}, |_| {});
        let id2 = endpoint.send_request("b", json!(null), |_| {}, |_| {});
        assert_eq!(id1, "req-1");
        assert_eq!(id2, "req-2");
        assert_eq!(outbox.borrow()[0]["id"], json!("req-1"));
        assert_eq!(outbox.borrow()[1]["id"], json!("req-2"));
    }

    #[test]
    fn progress_tokens_share_the_counter() {
        let (endpoint, _outbox) = collecting_endpoint();
        let id = endpoint.send_request("a", json!(null), |_| {}, |_| {});
        let token = endpoint.create_progress_token();
        assert_eq!(id, "req-1");
        assert_eq!(token, "tok-2");
    }

    #[test]
    fn pending_entry_lives_until_the_response() {
        let (endpoint, _outbox) = collecting_endpoint();
        let delivered = Rc::new(Cell::new(0));
        let counter = Rc::clone(&delivered);
        let id = endpoint.send_request("a", json!(null), move |_| counter.set(counter.get() + 1), |_| {});
        assert!(endpoint.has_pending(&id));

        endpoint.receive(&json!({"jsonrpc": "2.0", "result": 1, "id": id}));
        assert!(!endpoint.has_pending(&id));
        assert_eq!(delivered.get(), 1);

        // A second response for the same id is dropped.
        endpoint.receive(&json!({"jsonrpc": "2.0", "result": 2, "id": id}));
        assert_eq!(delivered.get(), 1);
    }

    #[test]
    fn unknown_response_ids_are_dropped_silently() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint.receive(&json!({"jsonrpc": "2.0", "result": 1, "id": "req-99"}));
        assert!(outbox.borrow().is_empty());
        assert_eq!(endpoint.pending_requests(), 0);
    }

    #[test]
    fn error_response_fires_the_error_callback() {
        let (endpoint, _outbox) = collecting_endpoint();
        let seen = Rc::new(RefCell::new(None));
        let captured = Rc::clone(&seen);
        let id = endpoint.send_request(
            "a",
            json!(null),
            |_| panic!("result callback must not fire"),
            move |e| *captured.borrow_mut() = Some(e.clone()),
        );
        endpoint.receive(&json!({
            "jsonrpc": "2.0",
            "error": {"code": -32601, "message": "Method not found: a"},
            "id": id
        }));
        assert_eq!(seen.borrow().as_ref().unwrap()["code"], json!(-32601));
    }

    #[test]
    fn notification_goes_out_without_id() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint.send_notification("status/changed", json!({"state": "idle"}));
        let msg = &outbox.borrow()[0];
        assert_eq!(msg["method"], json!("status/changed"));
        assert_eq!(msg.get("id"), None);
    }

    #[test]
    fn cancel_emits_the_builtin_notification() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint.cancel(json!(42));
        let msg = &outbox.borrow()[0];
        assert_eq!(msg["method"], json!("$/cancelRequest"));
        assert_eq!(msg["params"]["id"], json!(42));
        assert_eq!(msg.get("id"), None);
    }

    #[test]
    fn initialize_reports_capabilities_once() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint.set_server_capabilities(json!({"progress": true}));
        assert!(!endpoint.is_initialized());

        endpoint.receive(&json!({"jsonrpc": "2.0", "method": "initialize", "params": {}, "id": 1}));
        assert!(endpoint.is_initialized());
        assert_eq!(
            outbox.borrow()[0]["result"],
            json!({"capabilities": {"progress": true}})
        );

        // A second initialize is answered with invalid-request.
        endpoint.receive(&json!({"jsonrpc": "2.0", "method": "initialize", "params": {}, "id": 2}));
        assert_eq!(
            outbox.borrow()[1]["error"]["code"],
            json!(jdx_core::codes::INVALID_REQUEST)
        );
        assert!(endpoint.is_initialized());
    }

    #[test]
    fn empty_batch_answers_invalid_request() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint.receive(&json!([]));
        let msg = &outbox.borrow()[0];
        assert_eq!(msg["error"]["code"], json!(jdx_core::codes::INVALID_REQUEST));
        assert_eq!(msg["id"], json!(null));
    }

    #[test]
    fn typed_request_wraps_scalar_params() {
        let (endpoint, outbox) = collecting_endpoint();
        let id = endpoint
            .send_request_typed("double", &21i64, |_: i64| {}, |_| {})
            .unwrap();
        assert_eq!(outbox.borrow()[0]["params"], json!([21]));
        assert_eq!(outbox.borrow()[0]["id"], json!(id));
    }

    #[test]
    fn typed_notification_keeps_structured_params() {
        let (endpoint, outbox) = collecting_endpoint();
        endpoint
            .send_notification_typed("log", &json!({"level": "info"}))
            .unwrap();
        assert_eq!(outbox.borrow()[0]["params"], json!({"level": "info"}));
    }

    #[test]
    fn dropping_the_endpoint_drops_pending_callbacks_uninvoked() {
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        let endpoint = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
        let fired = Rc::new(Cell::new(false));
        let on_result = {
            let fired = Rc::clone(&fired);
            move |_: &Value| fired.set(true)
        };
        let on_error = {
            let fired = Rc::clone(&fired);
            move |_: &Value| fired.set(true)
        };
        endpoint.send_request("a", json!(null), on_result, on_error);
        drop(endpoint);
        assert!(!fired.get());
    }
}
