// ============================================================================
// ripple-streams - Type Definitions
// Events, errors, and the observer bookkeeping behind every source
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use super::constants::INITIAL_OBSERVER_CAPACITY;

// =============================================================================
// EVENTS
// =============================================================================

/// A single notification delivered to an observer.
///
/// `Error` and `Complete` are terminal: once a source has published either,
/// it never delivers again and drops its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// A value.
    Next(T),
    /// Terminal failure. Forwarded once; no further delivery.
    Error(StreamError),
    /// Terminal completion.
    Complete,
}

impl<T> Event<T> {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Next(_))
    }

    /// The terminal state this event transitions a source into, if any.
    pub(crate) fn as_terminal(&self) -> Option<Terminal> {
        match self {
            Event::Next(_) => None,
            Event::Error(err) => Some(Terminal::Failed(err.clone())),
            Event::Complete => Some(Terminal::Completed),
        }
    }
}

/// Recorded terminal state of a source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Terminal {
    Completed,
    Failed(StreamError),
}

impl Terminal {
    /// Re-materialize the event that produced this state, for late observers.
    pub(crate) fn as_event<T>(&self) -> Event<T> {
        match self {
            Terminal::Completed => Event::Complete,
            Terminal::Failed(err) => Event::Error(err.clone()),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure delivered through a pipeline.
///
/// Errors here are data, not faults: a pipeline forwards one terminal
/// `Event::Error` and stops; nothing is fatal to the process. Retry is the
/// concern of whoever issued the original request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A user-supplied transform returned an error.
    #[error("transform failed: {0}")]
    Transform(String),

    /// A payload could not be decoded into its model type.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The (mocked) service reported a failure.
    #[error("service failed: {0}")]
    Service(String),
}

// =============================================================================
// OBSERVERS
// =============================================================================

/// Identifies one observer registration on one source.
pub type ObserverId = u64;

/// Shared callback type stored in a source's observer list.
pub type EventFn<T> = Rc<dyn Fn(&Event<T>)>;

struct ObserverEntry<T> {
    id: ObserverId,
    callback: EventFn<T>,
}

/// Outcome of registering an observer on a source.
pub(crate) enum Register {
    /// Observer stored; events will be delivered until removal or terminal.
    Active(ObserverId),
    /// The source already terminated; nothing was stored.
    Terminated(Terminal),
}

// =============================================================================
// SOURCE CORE
// =============================================================================

/// The observer bookkeeping behind every source (emitter, slot, stage).
///
/// Delivery order equals registration order. Delivery snapshots the observer
/// list before notifying, so a callback may register or dispose observers on
/// the same source reentrantly; observers registered during a delivery do not
/// see the in-flight event.
pub struct SourceCore<T> {
    observers: RefCell<Vec<ObserverEntry<T>>>,
    next_id: Cell<ObserverId>,
    terminal: RefCell<Option<Terminal>>,
}

impl<T> SourceCore<T> {
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::with_capacity(INITIAL_OBSERVER_CAPACITY)),
            next_id: Cell::new(0),
            terminal: RefCell::new(None),
        }
    }

    /// Register a callback, unless the source already terminated.
    pub(crate) fn register(&self, callback: EventFn<T>) -> Register {
        if let Some(terminal) = self.terminal.borrow().as_ref() {
            return Register::Terminated(terminal.clone());
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push(ObserverEntry { id, callback });
        Register::Active(id)
    }

    /// Remove exactly the observer with the given id. Missing ids are a no-op,
    /// which is what makes double-dispose safe.
    pub(crate) fn remove(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|entry| entry.id != id);
    }

    /// Deliver an event to every currently-registered observer, in
    /// registration order.
    ///
    /// Terminal events flip the source into its terminal state *before*
    /// notifying, so reentrant publishes during the terminal delivery are
    /// suppressed; afterwards the observer list is dropped.
    pub fn publish(&self, event: &Event<T>) {
        if self.terminal.borrow().is_some() {
            return;
        }

        if let Some(terminal) = event.as_terminal() {
            *self.terminal.borrow_mut() = Some(terminal);
        }

        // Snapshot, then notify: callbacks may mutate the observer list.
        let snapshot: Vec<EventFn<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|entry| entry.callback.clone())
            .collect();

        for callback in snapshot {
            callback(event);
        }

        if event.is_terminal() {
            self.observers.borrow_mut().clear();
        }
    }

    /// Whether the source has published a terminal event.
    pub fn is_terminated(&self) -> bool {
        self.terminal.borrow().is_some()
    }

    /// Number of currently-registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl<T> Default for SourceCore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(core: &SourceCore<i32>, into: &Rc<RefCell<Vec<i32>>>) -> ObserverId {
        let into = into.clone();
        match core.register(Rc::new(move |ev: &Event<i32>| {
            if let Event::Next(v) = ev {
                into.borrow_mut().push(*v);
            }
        })) {
            Register::Active(id) => id,
            Register::Terminated(_) => panic!("source already terminated"),
        }
    }

    #[test]
    fn delivers_in_registration_order() {
        let core = SourceCore::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3 {
            let order = order.clone();
            let outcome = core.register(Rc::new(move |ev: &Event<i32>| {
                if let Event::Next(v) = ev {
                    order.borrow_mut().push((tag, *v));
                }
            }));
            assert!(matches!(outcome, Register::Active(_)));
        }

        core.publish(&Event::Next(7));
        assert_eq!(*order.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
    }

    #[test]
    fn no_delivery_before_registration() {
        let core = SourceCore::new();
        core.publish(&Event::Next(1));

        let seen = Rc::new(RefCell::new(Vec::new()));
        collect(&core, &seen);
        core.publish(&Event::Next(2));

        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn terminal_stops_delivery_and_drops_observers() {
        let core = SourceCore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        collect(&core, &seen);

        core.publish(&Event::Next(1));
        core.publish(&Event::Complete);
        core.publish(&Event::Next(2));

        assert_eq!(*seen.borrow(), vec![1]);
        assert!(core.is_terminated());
        assert_eq!(core.observer_count(), 0);
    }

    #[test]
    fn late_registration_reports_terminal() {
        let core: SourceCore<i32> = SourceCore::new();
        core.publish(&Event::Error(StreamError::Service("down".into())));

        match core.register(Rc::new(|_| {})) {
            Register::Terminated(Terminal::Failed(err)) => {
                assert_eq!(err, StreamError::Service("down".into()));
            }
            _ => panic!("expected terminal registration"),
        }
    }

    #[test]
    fn remove_is_idempotent() {
        let core = SourceCore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let id = collect(&core, &seen);

        core.remove(id);
        core.remove(id);
        core.publish(&Event::Next(1));

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn observer_registered_during_delivery_misses_the_event() {
        let core: Rc<SourceCore<i32>> = Rc::new(SourceCore::new());
        let late = Rc::new(RefCell::new(Vec::new()));

        let register_late = {
            let core = core.clone();
            let late = late.clone();
            Rc::new(move |ev: &Event<i32>| {
                if let Event::Next(_) = ev {
                    let late = late.clone();
                    let _ = core.register(Rc::new(move |ev: &Event<i32>| {
                        if let Event::Next(v) = ev {
                            late.borrow_mut().push(*v);
                        }
                    }));
                }
            })
        };
        let _ = core.register(register_late);

        core.publish(&Event::Next(1));
        assert!(late.borrow().is_empty());

        core.publish(&Event::Next(2));
        // The observer registered during event 1 sees event 2 (twice: one
        // registration per delivery of a Next).
        assert!(late.borrow().contains(&2));
    }
}
