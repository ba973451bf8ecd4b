// ============================================================================
// ripple-streams - Stream
//
// The operator-stage type. A Stream is itself a source: it implements the
// same observe/notify contract as an emitter, holds its upstream
// subscription(s) exclusively, and disposes them transitively when it is
// torn down or terminates.
//
// Stages subscribe upstream lazily, on their first observer. That is what
// lets a slot's synchronous replay travel through a whole pipeline built in
// one expression: the final `observe` call connects the chain from the
// bottom up, so the replayed value reaches the observer that was just
// registered. After the first observer a stage is hot and multicast.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::core::types::{Event, EventFn, Register, SourceCore, StreamError};
use crate::primitives::subscription::Subscription;
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::{combine, debounce, operators, switching};

// =============================================================================
// OBSERVABLE
// =============================================================================

/// The observe side of every source: emitters, slots, and streams.
///
/// `observe_events` sees the full event stream; `observe` is the values-only
/// convenience most pipelines end in.
pub trait Observable<T: 'static> {
    fn observe_events(&self, f: impl Fn(&Event<T>) + 'static) -> Subscription;

    fn observe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        self.observe_events(move |event| {
            if let Event::Next(value) = event {
                f(value);
            }
        })
    }
}

// =============================================================================
// STAGE INNER
// =============================================================================

/// Shared state of one operator stage.
///
/// `guards` exclusively owns the upstream subscriptions; dropping the stage
/// or publishing a terminal event releases them, which unwinds the chain.
/// `connect` is the deferred upstream hookup, consumed by the first
/// observer.
pub(crate) struct StageInner<T> {
    pub(crate) core: SourceCore<T>,
    guards: RefCell<Vec<Subscription>>,
    connect: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<T> StageInner<T> {
    pub(crate) fn new() -> Self {
        Self {
            core: SourceCore::new(),
            guards: RefCell::new(Vec::new()),
            connect: RefCell::new(None),
        }
    }

    /// Deliver an event downstream. Terminal events release the upstream
    /// guards: a finished stage holds nothing upstream alive.
    pub(crate) fn publish(&self, event: &Event<T>) {
        self.core.publish(event);
        if event.is_terminal() {
            self.guards.borrow_mut().clear();
        }
    }

    pub(crate) fn add_guard(&self, subscription: Subscription) {
        if self.core.is_terminated() {
            subscription.dispose();
            return;
        }
        self.guards.borrow_mut().push(subscription);
    }

    pub(crate) fn set_connect(&self, connect: Box<dyn FnOnce()>) {
        *self.connect.borrow_mut() = Some(connect);
    }

    fn run_connect(&self) {
        let connect = self.connect.borrow_mut().take();
        if let Some(connect) = connect {
            connect();
        }
    }
}

// =============================================================================
// STREAM
// =============================================================================

/// A composable operator stage over one or two upstream sources.
pub struct Stream<T> {
    pub(crate) inner: Rc<StageInner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Stream<T> {
    pub(crate) fn from_inner(inner: Rc<StageInner<T>>) -> Self {
        Self { inner }
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.core.is_terminated()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// A stream that delivers `value` then completes, on the next queue
    /// drain after its first observer arrives.
    pub fn once_on(scheduler: &Scheduler, value: T) -> Self {
        let inner = Rc::new(StageInner::new());
        let weak = Rc::downgrade(&inner);
        let scheduler = scheduler.clone();
        inner.set_connect(Box::new(move || {
            scheduler.post(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.publish(&Event::Next(value));
                    inner.publish(&Event::Complete);
                }
            });
        }));
        Self { inner }
    }

    /// A stream that delivers `value` then completes, `delay` after its
    /// first observer arrives. The simulated-latency shape of the mocked
    /// services.
    pub fn once_after(scheduler: &Scheduler, delay: Duration, value: T) -> Self {
        let inner = Rc::new(StageInner::new());
        let weak = Rc::downgrade(&inner);
        let scheduler = scheduler.clone();
        inner.set_connect(Box::new(move || {
            let _ = scheduler.post_after(delay, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.publish(&Event::Next(value));
                    inner.publish(&Event::Complete);
                }
            });
        }));
        Self { inner }
    }

    /// A stream that fails with `error`, `delay` after its first observer
    /// arrives.
    pub fn fail_after(scheduler: &Scheduler, delay: Duration, error: StreamError) -> Self {
        let inner = Rc::new(StageInner::new());
        let weak = Rc::downgrade(&inner);
        let scheduler = scheduler.clone();
        inner.set_connect(Box::new(move || {
            let _ = scheduler.post_after(delay, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.publish(&Event::Error(error));
                }
            });
        }));
        Self { inner }
    }
}

impl<T: 'static> Observable<T> for Stream<T> {
    fn observe_events(&self, f: impl Fn(&Event<T>) + 'static) -> Subscription {
        let callback: EventFn<T> = Rc::new(f);
        match self.inner.core.register(callback.clone()) {
            Register::Active(id) => {
                self.inner.run_connect();
                let anchor = self.inner.clone();
                Subscription::new(Box::new(move || anchor.core.remove(id)))
            }
            Register::Terminated(terminal) => {
                callback(&terminal.as_event());
                Subscription::disposed()
            }
        }
    }
}

// =============================================================================
// STAGE WIRING
// =============================================================================

/// Build a single-upstream stage: `handler` sees every upstream event and
/// decides what the stage publishes.
///
/// The upstream callback holds only a weak reference to the stage, so a
/// dropped stage silently unhooks; the stage's guard holds the upstream
/// subscription (and through it the upstream source) strongly.
pub(crate) fn stage<T, U, S, H>(source: &S, handler: H) -> Stream<U>
where
    T: 'static,
    U: 'static,
    S: Observable<T> + Clone + 'static,
    H: Fn(&Event<T>, &Rc<StageInner<U>>) + 'static,
{
    let inner: Rc<StageInner<U>> = Rc::new(StageInner::new());
    let weak = Rc::downgrade(&inner);
    let source = source.clone();

    inner.set_connect(Box::new(move || {
        let Some(strong) = weak.upgrade() else { return };
        let weak = weak.clone();
        let subscription = source.observe_events(move |event| {
            if let Some(inner) = weak.upgrade() {
                handler(event, &inner);
            }
        });
        strong.add_guard(subscription);
    }));

    Stream::from_inner(inner)
}

// =============================================================================
// OPERATOR SURFACE
// =============================================================================

/// Operator stages available on every source (emitter, slot, stream).
///
/// Each returns a new `Stream` that owns its upstream subscription.
pub trait StreamOps<T: Clone + 'static>: Observable<T> + Clone + Sized + 'static {
    /// Transform each value.
    fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Stream<U> {
        operators::map(self, f)
    }

    /// Transform each value fallibly. An `Err` becomes a terminal
    /// `Event::Error`; the stage delivers nothing further.
    fn try_map<U: Clone + 'static>(
        &self,
        f: impl Fn(&T) -> Result<U, StreamError> + 'static,
    ) -> Stream<U> {
        operators::try_map(self, f)
    }

    /// Keep only values satisfying `predicate`.
    fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        operators::filter(self, predicate)
    }

    /// Suppress consecutive equal values. The first value always passes.
    fn dedup(&self) -> Stream<T>
    where
        T: PartialEq,
    {
        operators::dedup_by(self, crate::reactivity::equality::equals)
    }

    /// `dedup` with an explicit equality - the choice point for payloads
    /// whose natural equality is not the right dedup key.
    fn dedup_by(&self, eq: impl Fn(&T, &T) -> bool + 'static) -> Stream<T> {
        operators::dedup_by(self, eq)
    }

    /// Running accumulator seeded with `seed`; delivers each new
    /// accumulator value.
    fn scan<A: Clone + 'static>(&self, seed: A, f: impl Fn(&A, &T) -> A + 'static) -> Stream<A> {
        operators::scan(self, seed, f)
    }

    /// Observe values passing through without altering them.
    fn tap(&self, f: impl Fn(&T) + 'static) -> Stream<T> {
        operators::tap(self, f)
    }

    /// Deliver a value only after `quiet` has elapsed with no newer one.
    fn debounce(&self, quiet: Duration, scheduler: &Scheduler) -> Stream<T> {
        debounce::debounce(self, quiet, scheduler)
    }

    /// Map each value to an inner stream, forwarding only the most recent
    /// inner stream's deliveries; a new value disposes the previous inner
    /// subscription. The cancellation policy for superseded async work.
    fn flat_map_latest<U: Clone + 'static>(
        &self,
        g: impl Fn(&T) -> Stream<U> + 'static,
    ) -> Stream<U> {
        switching::flat_map_latest(self, g)
    }

    /// Re-emit every event as a task on `scheduler`'s FIFO queue - the
    /// boundary every UI-facing delivery crosses.
    fn deliver_on(&self, scheduler: &Scheduler) -> Stream<T> {
        operators::deliver_on(self, scheduler)
    }

    /// Merge with another source, interleaving in arrival order.
    fn merge_with(&self, other: &(impl Observable<T> + Clone + 'static)) -> Stream<T> {
        combine::merge(self, other)
    }
}

impl<T: Clone + 'static, S: Observable<T> + Clone + 'static> StreamOps<T> for S {}

// =============================================================================
// TESTS
// =============================================================================
