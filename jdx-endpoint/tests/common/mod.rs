//! Shared helpers for endpoint integration tests: endpoints writing into
//! in-memory outboxes, bridged by hand.
#![allow(dead_code)]

use jdx_endpoint::Endpoint;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub type Outbox = Rc<RefCell<Vec<Value>>>;

/// An endpoint whose outbound messages collect in the returned outbox.
pub fn endpoint_with_outbox() -> (Endpoint, Outbox) {
    let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&outbox);
    let endpoint = Endpoint::new(move |msg| sink.borrow_mut().push(msg));
    (endpoint, outbox)
}

/// Deliver everything queued in `outbox` to `target`, in order.
///
/// Messages are drained before delivery so handlers can enqueue new
/// outbound messages while we iterate.
pub fn drain_into(outbox: &Outbox, target: &Endpoint) {
    let messages: Vec<Value> = outbox.borrow_mut().drain(..).collect();
    for message in messages {
        target.receive(&message);
    }
}
