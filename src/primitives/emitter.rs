// ============================================================================
// ripple-streams - Emitter
//
// A hot, multicast event source with no replay. Observers registered after
// an emit never see it. The push-side handle the UI shell pokes on user
// interaction.
// ============================================================================

use std::rc::Rc;

use crate::core::types::{Event, Register, SourceCore, StreamError};
use crate::primitives::subscription::Subscription;
use crate::reactivity::stream::Observable;

/// Create a new emitter.
pub fn emitter<T: 'static>() -> Emitter<T> {
    Emitter::new()
}

/// Hot multicast source of discrete events.
pub struct Emitter<T> {
    inner: Rc<SourceCore<T>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SourceCore::new()),
        }
    }

    /// Deliver `value` synchronously to every currently-registered observer,
    /// in registration order. No buffering.
    pub fn emit(&self, value: T) {
        self.inner.publish(&Event::Next(value));
    }

    /// End the stream. Observers receive `Event::Complete` and are dropped.
    pub fn complete(&self) {
        self.inner.publish(&Event::Complete);
    }

    /// End the stream with a failure.
    pub fn fail(&self, error: StreamError) {
        self.inner.publish(&Event::Error(error));
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Observable<T> for Emitter<T> {
    fn observe_events(&self, f: impl Fn(&Event<T>) + 'static) -> Subscription {
        let callback: crate::core::types::EventFn<T> = Rc::new(f);
        match self.inner.register(callback.clone()) {
            Register::Active(id) => {
                let anchor = self.inner.clone();
                Subscription::new(Box::new(move || anchor.remove(id)))
            }
            Register::Terminated(terminal) => {
                callback(&terminal.as_event());
                Subscription::disposed()
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
