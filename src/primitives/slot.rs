// ============================================================================
// ripple-streams - Stateful Slot
//
// A multicast source that remembers its latest value and redelivers it
// synchronously to each new observer. The stream rendering of a published
// property: it never completes, and setting an equal value still delivers -
// dedup is an explicit stage, never implicit.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{Event, Register, SourceCore};
use crate::primitives::subscription::Subscription;
use crate::reactivity::stream::Observable;

/// Create a new slot holding `initial`.
pub fn slot<T: Clone + 'static>(initial: T) -> Slot<T> {
    Slot::new(initial)
}

struct SlotInner<T> {
    value: RefCell<T>,
    core: SourceCore<T>,
}

/// Multicast source with a current value.
pub struct Slot<T> {
    inner: Rc<SlotInner<T>>,
}

impl<T: Clone + 'static> Slot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(SlotInner {
                value: RefCell::new(initial),
                core: SourceCore::new(),
            }),
        }
    }

    /// The last value set (or the initial value if never mutated).
    pub fn current(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value`, then deliver it to all observers in registration order.
    /// Equal values still deliver.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.core.publish(&Event::Next(value));
    }

    /// Mutate the value in place, then deliver the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let next = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value);
            value.clone()
        };
        self.inner.core.publish(&Event::Next(next));
    }

    pub fn observer_count(&self) -> usize {
        self.inner.core.observer_count()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Observable<T> for Slot<T> {
    /// Registers the callback, then synchronously hands it the current value
    /// before returning - a new observer's first notification is always the
    /// slot's present state.
    fn observe_events(&self, f: impl Fn(&Event<T>) + 'static) -> Subscription {
        let callback: crate::core::types::EventFn<T> = Rc::new(f);
        let id = match self.inner.core.register(callback.clone()) {
            Register::Active(id) => id,
            // Slots expose no terminal operations, so registration is
            // always live.
            Register::Terminated(_) => unreachable!("slots never terminate"),
        };

        let current = self.inner.value.borrow().clone();
        callback(&Event::Next(current));

        let anchor = self.inner.clone();
        Subscription::new(Box::new(move || anchor.core.remove(id)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
