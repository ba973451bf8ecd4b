// ============================================================================
// ripple-streams - Single-upstream Operator Stages
// map / try_map / filter / dedup / scan / tap / deliver_on
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{Event, StreamError};
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{stage, Observable, StageInner, Stream};

/// Split an upstream event: hand back the value of a `Next`, forward a
/// terminal event downstream as-is.
fn on_next<'a, T, U>(event: &'a Event<T>, inner: &StageInner<U>) -> Option<&'a T> {
    match event {
        Event::Next(value) => Some(value),
        Event::Error(err) => {
            inner.publish(&Event::Error(err.clone()));
            None
        }
        Event::Complete => {
            inner.publish(&Event::Complete);
            None
        }
    }
}

pub(crate) fn map<T, U, S>(source: &S, f: impl Fn(&T) -> U + 'static) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            inner.publish(&Event::Next(f(value)));
        }
    })
}

pub(crate) fn try_map<T, U, S>(
    source: &S,
    f: impl Fn(&T) -> Result<U, StreamError> + 'static,
) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            match f(value) {
                Ok(mapped) => inner.publish(&Event::Next(mapped)),
                Err(err) => inner.publish(&Event::Error(err)),
            }
        }
    })
}

pub(crate) fn filter<T, S>(source: &S, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            if predicate(value) {
                inner.publish(event);
            }
        }
    })
}

pub(crate) fn dedup_by<T, S>(source: &S, eq: impl Fn(&T, &T) -> bool + 'static) -> Stream<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    let last: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            let delivers = match &*last.borrow() {
                Some(previous) => !eq(previous, value),
                None => true,
            };
            if delivers {
                *last.borrow_mut() = Some(value.clone());
                inner.publish(event);
            }
        }
    })
}

pub(crate) fn scan<T, A, S>(source: &S, seed: A, f: impl Fn(&A, &T) -> A + 'static) -> Stream<A>
where
    T: Clone + 'static,
    A: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    let accumulator = Rc::new(RefCell::new(seed));
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            let next = {
                let current = accumulator.borrow();
                f(&current, value)
            };
            *accumulator.borrow_mut() = next.clone();
            inner.publish(&Event::Next(next));
        }
    })
}

pub(crate) fn tap<T, S>(source: &S, f: impl Fn(&T) + 'static) -> Stream<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    stage(source, move |event, inner| {
        if let Some(value) = on_next(event, inner) {
            f(value);
            inner.publish(event);
        }
    })
}

pub(crate) fn deliver_on<T, S>(source: &S, scheduler: &Scheduler) -> Stream<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    let scheduler = scheduler.clone();
    stage(source, move |event, inner| {
        let event = event.clone();
        let weak = Rc::downgrade(inner);
        scheduler.post(move || {
            if let Some(inner) = weak.upgrade() {
                inner.publish(&event);
            }
        });
    })
}

// =============================================================================
// TESTS
// =============================================================================
