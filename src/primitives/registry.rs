// ============================================================================
// ripple-streams - Subscription Registry
//
// Owning bag of subscriptions with one lifetime: the view-model that created
// them. Cleared exactly once, either explicitly or on drop.
// ============================================================================

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::primitives::subscription::Subscription;

/// Collects the subscriptions a component owns so they can be released
/// en masse when the component is discarded.
pub struct Registry {
    subscriptions: RefCell<Vec<Subscription>>,
    active: Cell<bool>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(Vec::new()),
            active: Cell::new(true),
        }
    }

    /// Take ownership of a subscription.
    ///
    /// Adding to an already-disposed registry disposes the subscription
    /// immediately: a late-wired pipeline on a dead component must not leak.
    pub fn add(&self, subscription: Subscription) {
        if !self.active.get() {
            subscription.dispose();
            return;
        }
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Dispose every stored subscription. Idempotent: only the first call
    /// does anything.
    pub fn dispose_all(&self) {
        if !self.active.replace(false) {
            return;
        }

        let drained: Vec<Subscription> = self.subscriptions.borrow_mut().drain(..).collect();
        debug!(count = drained.len(), "registry disposed");
        for subscription in drained {
            subscription.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================
