//! Method dispatch for JSON-RPC requests and notifications
//!
//! The [`Dispatcher`] maps method names to handler functions and implements
//! the spec's error mapping for single messages and batches. It operates on
//! raw values because malformed input still needs a spec-correct answer:
//! anything that fails structural validation is answered with invalid-request
//! and a null id.
//!
//! Handlers are plain synchronous closures over the params value; they run to
//! completion on the thread that called [`Dispatcher::handle`]. The handler
//! map uses interior mutability so registration works through a shared
//! reference (the endpoint layer keeps the dispatcher behind an `Rc`); the
//! type is deliberately not `Sync` and commits to single-threaded use.
//!
//! # Examples
//!
//! ```rust
//! use jdx_endpoint::Dispatcher;
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.register("add", |params| {
//!     let a = params[0].as_i64().unwrap_or(0);
//!     let b = params[1].as_i64().unwrap_or(0);
//!     Ok(json!(a + b))
//! });
//!
//! let req = json!({"jsonrpc": "2.0", "method": "add", "params": [5, 3], "id": 1});
//! let resp = dispatcher.handle(&req).unwrap();
//! assert_eq!(resp["result"], json!(8));
//! ```

use jdx_core::{make_error, make_result, validate_request, Error, ErrorObject, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A registered method handler.
///
/// Receives the raw params value (array, object, or null when absent) and
/// returns the result value, or an [`Error`]: [`Error::Rpc`] propagates its
/// [`ErrorObject`] into the response verbatim, anything else becomes
/// internal-error with the description in `data.what`.
pub type HandlerFn = dyn Fn(&Value) -> Result<Value>;

/// Handler registry with spec-correct single- and batch-message dispatch.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RefCell<HashMap<String, Rc<HandlerFn>>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method; re-registration replaces.
    pub fn register(
        &self,
        method: impl Into<String>,
        handler: impl Fn(&Value) -> Result<Value> + 'static,
    ) {
        self.handlers
            .borrow_mut()
            .insert(method.into(), Rc::new(handler));
    }

    /// True when a handler is registered for `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.borrow().contains_key(method)
    }

    /// Names of all registered methods.
    pub fn methods(&self) -> Vec<String> {
        self.handlers.borrow().keys().cloned().collect()
    }

    fn get(&self, method: &str) -> Option<Rc<HandlerFn>> {
        self.handlers.borrow().get(method).cloned()
    }

    /// Dispatch one request or notification.
    ///
    /// Returns the outbound response value for a request, or `None` for a
    /// notification; notifications are never answered, whatever the outcome.
    pub fn handle_single(&self, msg: &Value) -> Option<Value> {
        if let Err(reason) = validate_request(msg) {
            // Malformed incoming requests always surface a null id.
            return Some(make_error(
                Value::Null,
                &ErrorObject::invalid_request(reason),
            ));
        }
        let is_notification = msg.get("id").is_none();
        let id = msg.get("id").cloned().unwrap_or(Value::Null);
        let Some(method) = msg.get("method").and_then(Value::as_str) else {
            // Unreachable after validate_request; answered, not panicked on.
            return Some(make_error(
                Value::Null,
                &ErrorObject::invalid_request("method missing or not a string"),
            ));
        };

        let Some(handler) = self.get(method) else {
            if is_notification {
                return None;
            }
            tracing::debug!(method, "method not found");
            return Some(make_error(id, &ErrorObject::method_not_found(method)));
        };

        tracing::debug!(method, notification = is_notification, "dispatching");
        let params = msg.get("params").cloned().unwrap_or(Value::Null);
        let outcome = handler(&params);
        if is_notification {
            return None;
        }
        Some(match outcome {
            Ok(result) => make_result(id, result),
            Err(Error::Rpc(e)) => make_error(id, &e),
            Err(other) => make_error(
                id,
                &ErrorObject::internal_error("Internal error").with_what(other.to_string()),
            ),
        })
    }

    /// Dispatch a single message or a batch.
    ///
    /// An empty batch is answered with a single invalid-request response.
    /// Batch elements are processed in input order; the response array
    /// preserves that order and skips notifications. `None` means nothing
    /// goes back on the wire (a notification, or an all-notification batch).
    pub fn handle(&self, input: &Value) -> Option<Value> {
        let Some(elements) = input.as_array() else {
            return self.handle_single(input);
        };
        if elements.is_empty() {
            return Some(make_error(
                Value::Null,
                &ErrorObject::invalid_request("empty batch"),
            ));
        }
        let responses: Vec<Value> = elements
            .iter()
            .filter_map(|element| self.handle_single(element))
            .collect();
        tracing::debug!(
            requests = elements.len(),
            responses = responses.len(),
            "batch dispatched"
        );
        if responses.is_empty() {
            None
        } else {
            Some(Value::Array(responses))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdx_core::codes;
    use serde_json::json;

    fn arithmetic_dispatcher() -> Dispatcher {
        let dispatcher = Dispatcher::new();
        dispatcher.register("add", |params| {
            let a = params[0].as_i64().unwrap_or(0);
            let b = params[1].as_i64().unwrap_or(0);
            Ok(json!(a + b))
        });
        dispatcher.register("divide", |params| {
            let a = params[0].as_i64().unwrap_or(0);
            let b = params[1].as_i64().unwrap_or(0);
            if b == 0 {
                return Err(Error::Rpc(ErrorObject::new(-32000, "Division by zero")));
            }
            Ok(json!(a / b))
        });
        dispatcher
    }

    #[test]
    fn simple_method() {
        let d = arithmetic_dispatcher();
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "add", "params": [5, 3], "id": 1}))
            .unwrap();
        assert_eq!(resp, json!({"jsonrpc": "2.0", "id": 1, "result": 8}));
    }

    #[test]
    fn success_response_has_no_error_member() {
        let d = arithmetic_dispatcher();
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "add", "params": [1, 1], "id": 2}))
            .unwrap();
        assert!(resp.get("error").is_none());
        assert!(resp.get("result").is_some());
    }

    #[test]
    fn method_not_found_echoes_id() {
        let d = Dispatcher::new();
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "x", "id": 1}))
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::METHOD_NOT_FOUND));
        assert_eq!(resp["id"], json!(1));
    }

    #[test]
    fn notifications_are_never_answered() {
        let d = Dispatcher::new();
        // Unknown method
        assert_eq!(
            d.handle_single(&json!({"jsonrpc": "2.0", "method": "nope"})),
            None
        );
        // Handler that succeeds
        d.register("ok", |_| Ok(json!(1)));
        assert_eq!(
            d.handle_single(&json!({"jsonrpc": "2.0", "method": "ok"})),
            None
        );
        // Handler that fails
        d.register("fail", |_| {
            Err(Error::Rpc(ErrorObject::new(-32000, "boom")))
        });
        assert_eq!(
            d.handle_single(&json!({"jsonrpc": "2.0", "method": "fail"})),
            None
        );
    }

    #[test]
    fn malformed_request_gets_null_id() {
        let d = Dispatcher::new();
        let resp = d
            .handle_single(&json!({"method": "add", "id": 7}))
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::INVALID_REQUEST));
        assert_eq!(resp["id"], json!(null));
    }

    #[test]
    fn domain_error_propagates_verbatim() {
        let d = arithmetic_dispatcher();
        let resp = d
            .handle_single(
                &json!({"jsonrpc": "2.0", "method": "divide", "params": [10, 0], "id": 9}),
            )
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(-32000));
        assert_eq!(resp["error"]["message"], json!("Division by zero"));
        assert_eq!(resp["id"], json!(9));
    }

    #[test]
    fn other_errors_map_to_internal_with_what() {
        let d = Dispatcher::new();
        d.register("broken", |_| {
            Err(Error::Internal("index out of range".to_string()))
        });
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "broken", "id": 3}))
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::INTERNAL_ERROR));
        assert_eq!(
            resp["error"]["data"]["what"],
            json!("internal error: index out of range")
        );
    }

    #[test]
    fn re_registration_replaces() {
        let d = Dispatcher::new();
        d.register("m", |_| Ok(json!(1)));
        d.register("m", |_| Ok(json!(2)));
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "m", "id": 1}))
            .unwrap();
        assert_eq!(resp["result"], json!(2));
        assert_eq!(d.methods(), vec!["m".to_string()]);
    }

    #[test]
    fn batch_preserves_order_and_skips_notifications() {
        let d = arithmetic_dispatcher();
        let batch = json!([
            {"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": 10},
            {"jsonrpc": "2.0", "method": "add", "params": [3, 4], "id": 11},
            {"jsonrpc": "2.0", "method": "add", "params": [99, 1]}
        ]);
        let out = d.handle(&batch).unwrap();
        let responses = out.as_array().unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], json!(10));
        assert_eq!(responses[0]["result"], json!(3));
        assert_eq!(responses[1]["id"], json!(11));
        assert_eq!(responses[1]["result"], json!(7));
    }

    #[test]
    fn empty_batch_is_invalid_request() {
        let d = Dispatcher::new();
        let out = d.handle(&json!([])).unwrap();
        assert_eq!(out["error"]["code"], json!(codes::INVALID_REQUEST));
        assert_eq!(out["id"], json!(null));
    }

    #[test]
    fn all_notification_batch_produces_nothing() {
        let d = arithmetic_dispatcher();
        let batch = json!([
            {"jsonrpc": "2.0", "method": "add", "params": [1, 2]},
            {"jsonrpc": "2.0", "method": "missing"}
        ]);
        assert_eq!(d.handle(&batch), None);
    }

    #[test]
    fn non_object_batch_elements_surface_as_invalid_request() {
        let d = arithmetic_dispatcher();
        let batch = json!([
            1,
            {"jsonrpc": "2.0", "method": "add", "params": [2, 2], "id": 5},
            "text"
        ]);
        let out = d.handle(&batch).unwrap();
        let responses = out.as_array().unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], json!(codes::INVALID_REQUEST));
        assert_eq!(responses[0]["id"], json!(null));
        assert_eq!(responses[1]["result"], json!(4));
        assert_eq!(responses[2]["error"]["code"], json!(codes::INVALID_REQUEST));
    }

    #[test]
    fn mixed_batch_counts_match() {
        let d = arithmetic_dispatcher();
        let batch = json!([
            {"jsonrpc": "2.0", "method": "add", "params": [10, 5], "id": 1},
            {"jsonrpc": "2.0", "method": "divide", "params": [10, 0], "id": 2},
            {"jsonrpc": "2.0", "method": "log", "params": {"msg": "hi"}},
            {"jsonrpc": "2.0", "method": "unknown", "id": 3}
        ]);
        let out = d.handle(&batch).unwrap();
        let responses = out.as_array().unwrap();
        // One element per non-notification request, input order preserved.
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"], json!(15));
        assert_eq!(responses[1]["error"]["code"], json!(-32000));
        assert_eq!(responses[2]["error"]["code"], json!(codes::METHOD_NOT_FOUND));
    }

    #[test]
    fn params_default_to_null() {
        let d = Dispatcher::new();
        d.register("echo_params", |params| Ok(params.clone()));
        let resp = d
            .handle_single(&json!({"jsonrpc": "2.0", "method": "echo_params", "id": 1}))
            .unwrap();
        assert_eq!(resp["result"], json!(null));
    }
}
