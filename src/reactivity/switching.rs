// ============================================================================
// ripple-streams - Flat-map-latest
//
// Maps each upstream value to an inner stream and forwards only the most
// recent inner stream's deliveries. Every new upstream value disposes the
// previous inner subscription - the cancellation policy that makes stale
// async work (a superseded search request) incapable of reaching the UI.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::core::types::Event;
use crate::primitives::subscription::Subscription;
use crate::reactivity::stream::{stage, Observable, Stream};

#[derive(Default)]
struct SwitchState {
    inner_sub: RefCell<Option<Subscription>>,
    inner_live: Cell<bool>,
    outer_done: Cell<bool>,
}

pub(crate) fn flat_map_latest<T, U, S, G>(source: &S, g: G) -> Stream<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    S: Observable<T> + Clone + 'static,
    G: Fn(&T) -> Stream<U> + 'static,
{
    let state = Rc::new(SwitchState::default());

    let stream = stage(source, {
        let state = state.clone();
        move |event, inner| match event {
            Event::Next(value) => {
                if let Some(previous) = state.inner_sub.borrow_mut().take() {
                    trace!("superseded inner subscription disposed");
                    previous.dispose();
                }

                let inner_stream = g(value);
                state.inner_live.set(true);

                let weak = Rc::downgrade(inner);
                let inner_state = state.clone();
                let subscription = inner_stream.observe_events(move |inner_event| {
                    match inner_event {
                        Event::Next(value) => {
                            if let Some(stage) = weak.upgrade() {
                                stage.publish(&Event::Next(value.clone()));
                            }
                        }
                        Event::Error(err) => {
                            inner_state.inner_live.set(false);
                            if let Some(stage) = weak.upgrade() {
                                stage.publish(&Event::Error(err.clone()));
                            }
                        }
                        Event::Complete => {
                            // An inner stream finishing does not finish the
                            // stage; the outer source may map more values.
                            inner_state.inner_live.set(false);
                            if inner_state.outer_done.get() {
                                if let Some(stage) = weak.upgrade() {
                                    stage.publish(&Event::Complete);
                                }
                            }
                        }
                    }
                });
                *state.inner_sub.borrow_mut() = Some(subscription);
            }
            Event::Error(err) => inner.publish(&Event::Error(err.clone())),
            Event::Complete => {
                state.outer_done.set(true);
                if !state.inner_live.get() {
                    inner.publish(&Event::Complete);
                }
            }
        }
    });

    // Tearing the stage down disposes whatever inner subscription is live.
    stream.inner.add_guard(Subscription::new(Box::new(move || {
        if let Some(subscription) = state.inner_sub.borrow_mut().take() {
            subscription.dispose();
        }
    })));

    stream
}

// =============================================================================
// TESTS
// =============================================================================
