//! Ambient per-call handler context
//!
//! A running handler can observe its own request id, report progress, and
//! poll for cancellation without threading a context argument through every
//! helper. The endpoint installs a [`CallContext`] into a thread-local slot
//! for the dynamic extent of each handler invocation; the free functions
//! [`current_context`], [`is_cancelled`] and [`report_progress`] read that
//! slot and fall back to safe defaults when no handler is active.
//!
//! The slot is installed and restored by an RAII guard, so it is cleared on
//! return, error, and unwind alike. It is strictly thread-local: a handler
//! that hands work to another thread must clone the context into that work
//! first (the type is cheaply cloneable for exactly this reason).

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared cancellation flag for one in-flight request.
///
/// The `$/cancelRequest` handler sets it; the user handler polls it. Clones
/// observe the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request as cancelled. Idempotent.
    pub fn set(&self) {
        self.0.set(true);
    }

    /// True once the request has been cancelled.
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

/// The context of one handler invocation: request id, progress sink,
/// cancellation flag.
#[derive(Clone)]
pub struct CallContext {
    id: Value,
    progress: Rc<dyn Fn(Value)>,
    cancelled: CancelFlag,
}

impl CallContext {
    /// Build a context; `progress` is the sink progress reports go to.
    pub fn new(id: Value, cancelled: CancelFlag, progress: impl Fn(Value) + 'static) -> Self {
        Self {
            id,
            progress: Rc::new(progress),
            cancelled,
        }
    }

    /// The inbound request id; null for notifications.
    pub fn id(&self) -> &Value {
        &self.id
    }

    /// Poll the cancellation flag.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_set()
    }

    /// Send a progress value to this call's sink.
    pub fn report_progress(&self, value: Value) {
        (self.progress)(value);
    }

    /// Publish this context into the ambient slot for the current scope.
    ///
    /// The previous occupant is restored when the returned guard drops.
    pub fn enter(&self) -> ContextScope {
        ContextScope::activate(self.clone())
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<CallContext>> = const { RefCell::new(None) };
}

/// Guard keeping a [`CallContext`] published; restores the previous context
/// on drop.
pub struct ContextScope {
    previous: Option<CallContext>,
}

impl ContextScope {
    fn activate(ctx: CallContext) -> Self {
        let previous = ACTIVE.with(|slot| slot.borrow_mut().replace(ctx));
        Self { previous }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        ACTIVE.with(|slot| *slot.borrow_mut() = self.previous.take());
    }
}

/// The context of the currently running handler, if any.
pub fn current_context() -> Option<CallContext> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Poll cancellation for the currently running handler.
///
/// False when no handler is active.
pub fn is_cancelled() -> bool {
    ACTIVE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(CallContext::is_cancelled)
            .unwrap_or(false)
    })
}

/// Report progress from the currently running handler.
///
/// Suppressed when no handler is active. The sink is cloned out of the slot
/// before it runs, so a sink that re-enters dispatch cannot observe a held
/// borrow.
pub fn report_progress(value: Value) {
    let sink = ACTIVE.with(|slot| slot.borrow().as_ref().map(|ctx| ctx.progress.clone()));
    if let Some(sink) = sink {
        sink(value);
    }
}
