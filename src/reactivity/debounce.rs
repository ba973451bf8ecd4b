// ============================================================================
// ripple-streams - Debounce
//
// Trailing-edge debounce on the scheduler's timer heap. Each upstream value
// cancels any pending timer and arms a fresh one; only a value that survives
// the full quiet period is delivered.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::core::types::Event;
use crate::primitives::subscription::Subscription;
use crate::reactivity::scheduling::{Scheduler, TimerHandle};
use crate::reactivity::stream::{stage, Observable, Stream};

struct DebounceState {
    pending: RefCell<Option<TimerHandle>>,
    finish_after_flush: Cell<bool>,
}

impl Drop for DebounceState {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.cancel();
        }
    }
}

pub(crate) fn debounce<T, S>(source: &S, quiet: Duration, scheduler: &Scheduler) -> Stream<T>
where
    T: Clone + 'static,
    S: Observable<T> + Clone + 'static,
{
    let scheduler = scheduler.clone();
    let state = Rc::new(DebounceState {
        pending: RefCell::new(None),
        finish_after_flush: Cell::new(false),
    });

    let stream = stage(source, {
        let state = state.clone();
        move |event, inner| match event {
            Event::Next(value) => {
                if let Some(previous) = state.pending.borrow_mut().take() {
                    previous.cancel();
                }

                let weak = Rc::downgrade(inner);
                let timer_state = state.clone();
                let value = value.clone();
                let handle = scheduler.post_after(quiet, move || {
                    timer_state.pending.borrow_mut().take();
                    let Some(inner) = weak.upgrade() else { return };
                    inner.publish(&Event::Next(value));
                    // Upstream completed while this timer was pending: the
                    // held value flushes first, then completion follows.
                    if timer_state.finish_after_flush.get() {
                        inner.publish(&Event::Complete);
                    }
                });
                *state.pending.borrow_mut() = Some(handle);
            }
            Event::Error(err) => {
                // Failure is terminal either way; no held value can follow it.
                if let Some(previous) = state.pending.borrow_mut().take() {
                    previous.cancel();
                }
                inner.publish(&Event::Error(err.clone()));
            }
            Event::Complete => {
                if state.pending.borrow().is_some() {
                    state.finish_after_flush.set(true);
                } else {
                    inner.publish(&Event::Complete);
                }
            }
        }
    });

    // Tearing the stage down cancels a pending timer eagerly.
    stream.inner.add_guard(Subscription::new(Box::new(move || {
        if let Some(handle) = state.pending.borrow_mut().take() {
            handle.cancel();
        }
    })));

    stream
}

// =============================================================================
// TESTS
// =============================================================================
