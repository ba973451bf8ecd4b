// ============================================================================
// ripple-streams - Subscription
//
// A disposable handle binding one observer callback to one source.
// Disposing removes exactly that callback; double-dispose is a no-op.
// Dropping the handle disposes it, so an undisposed subscription cannot
// outlive its owner by accident.
// ============================================================================

use std::cell::{Cell, RefCell};

use crate::primitives::registry::Registry;

/// Teardown run exactly once when the subscription is disposed.
///
/// The closure owns the strong reference that keeps the observed stage (and,
/// through its guards, the whole upstream chain) alive; running the teardown
/// removes the callback and releases that anchor.
type Teardown = Box<dyn FnOnce()>;

/// Handle for one observer registration.
pub struct Subscription {
    disposed: Cell<bool>,
    teardown: RefCell<Option<Teardown>>,
}

impl Subscription {
    pub(crate) fn new(teardown: Teardown) -> Self {
        Self {
            disposed: Cell::new(false),
            teardown: RefCell::new(Some(teardown)),
        }
    }

    /// A handle that is already spent: observing an already-terminated source
    /// delivers the terminal event immediately and registers nothing.
    pub(crate) fn disposed() -> Self {
        Self {
            disposed: Cell::new(true),
            teardown: RefCell::new(None),
        }
    }

    /// Remove this subscription's callback from its source.
    ///
    /// Safe to call more than once; only the first call runs the teardown.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(teardown) = self.teardown.borrow_mut().take() {
            teardown();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Hand ownership to a registry, the usual way a view-model keeps its
    /// pipeline subscriptions for bulk disposal.
    pub fn store_in(self, registry: &Registry) {
        registry.add(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
