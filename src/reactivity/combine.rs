// ============================================================================
// ripple-streams - Two-upstream Operator Stages
// merge / combine_latest
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::types::Event;
use crate::reactivity::stream::{Observable, StageInner, Stream};

// =============================================================================
// MERGE
// =============================================================================

/// Interleave two sources of the same type in arrival order.
///
/// Each source's own order is preserved. Completion is forwarded only after
/// both sources have completed; the first error wins and terminates the
/// stage.
pub fn merge<T, A, B>(a: &A, b: &B) -> Stream<T>
where
    T: Clone + 'static,
    A: Observable<T> + Clone + 'static,
    B: Observable<T> + Clone + 'static,
{
    let inner: Rc<StageInner<T>> = Rc::new(StageInner::new());
    let weak = Rc::downgrade(&inner);
    let a = a.clone();
    let b = b.clone();

    let connect_weak = weak.clone();
    inner.set_connect(Box::new(move || {
        let Some(strong) = connect_weak.upgrade() else { return };
        let open = Rc::new(Cell::new(2u8));
        strong.add_guard(a.observe_events(merge_side(weak.clone(), open.clone())));
        strong.add_guard(b.observe_events(merge_side(weak, open)));
    }));

    Stream::from_inner(inner)
}

fn merge_side<T: Clone + 'static>(
    weak: Weak<StageInner<T>>,
    open: Rc<Cell<u8>>,
) -> impl Fn(&Event<T>) + 'static {
    move |event| {
        let Some(inner) = weak.upgrade() else { return };
        match event {
            Event::Next(_) | Event::Error(_) => inner.publish(event),
            Event::Complete => {
                open.set(open.get() - 1);
                if open.get() == 0 {
                    inner.publish(&Event::Complete);
                }
            }
        }
    }
}

// =============================================================================
// COMBINE LATEST
// =============================================================================

/// Pair the latest values of two sources.
///
/// Nothing is delivered until both sides have delivered at least once;
/// thereafter every update from either side delivers one fresh pair.
pub fn combine_latest<A, B, SA, SB>(a: &SA, b: &SB) -> Stream<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    SA: Observable<A> + Clone + 'static,
    SB: Observable<B> + Clone + 'static,
{
    let inner: Rc<StageInner<(A, B)>> = Rc::new(StageInner::new());
    let weak = Rc::downgrade(&inner);
    let a = a.clone();
    let b = b.clone();

    let connect_weak = weak.clone();
    inner.set_connect(Box::new(move || {
        let Some(strong) = connect_weak.upgrade() else { return };
        let latest: Rc<Latest<A, B>> = Rc::new(Latest {
            left: RefCell::new(None),
            right: RefCell::new(None),
        });
        let open = Rc::new(Cell::new(2u8));

        let left_sub = {
            let weak = weak.clone();
            let latest = latest.clone();
            let open = open.clone();
            a.observe_events(move |event| {
                let Some(inner) = weak.upgrade() else { return };
                match event {
                    Event::Next(value) => {
                        *latest.left.borrow_mut() = Some(value.clone());
                        latest.emit_pair(&inner);
                    }
                    Event::Error(err) => inner.publish(&Event::Error(err.clone())),
                    Event::Complete => close_side(&inner, &open),
                }
            })
        };

        let right_sub = {
            let latest = latest.clone();
            b.observe_events(move |event| {
                let Some(inner) = weak.upgrade() else { return };
                match event {
                    Event::Next(value) => {
                        *latest.right.borrow_mut() = Some(value.clone());
                        latest.emit_pair(&inner);
                    }
                    Event::Error(err) => inner.publish(&Event::Error(err.clone())),
                    Event::Complete => close_side(&inner, &open),
                }
            })
        };

        strong.add_guard(left_sub);
        strong.add_guard(right_sub);
    }));

    Stream::from_inner(inner)
}

struct Latest<A, B> {
    left: RefCell<Option<A>>,
    right: RefCell<Option<B>>,
}

impl<A: Clone, B: Clone> Latest<A, B> {
    fn emit_pair(&self, inner: &StageInner<(A, B)>) {
        // Clone out before publishing so no borrow is held across
        // observer callbacks.
        let pair = match (&*self.left.borrow(), &*self.right.borrow()) {
            (Some(left), Some(right)) => Some((left.clone(), right.clone())),
            _ => None,
        };
        if let Some(pair) = pair {
            inner.publish(&Event::Next(pair));
        }
    }
}

fn close_side<T>(inner: &StageInner<T>, open: &Cell<u8>) {
    open.set(open.get() - 1);
    if open.get() == 0 {
        inner.publish(&Event::Complete);
    }
}

// =============================================================================
// TESTS
// =============================================================================
