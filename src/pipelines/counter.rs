// ============================================================================
// ripple-streams - Counter Pipeline
//
// Button taps become streams, merge, then accumulate with scan. The count
// is always the running sum of all +1/-1 events since subscription start;
// it resets only when the pipeline is rebuilt.
// ============================================================================

use crate::primitives::emitter::{emitter, Emitter};
use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::combine::merge;
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, StreamOps};

pub struct CounterModel {
    pub increment: Emitter<()>,
    pub decrement: Emitter<()>,
    pub count: Slot<i32>,
    registry: Registry,
}

impl CounterModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        let increment = emitter();
        let decrement = emitter();
        let count = slot(0);
        let registry = Registry::new();

        merge(&increment.map(|_| 1), &decrement.map(|_| -1))
            .scan(0, |acc, step| acc + step)
            .deliver_on(scheduler)
            .observe({
                let count = count.clone();
                move |total: &i32| count.set(*total)
            })
            .store_in(&registry);

        Self {
            increment,
            decrement,
            count,
            registry,
        }
    }

    /// Tear the pipeline down; taps no longer reach the count.
    pub fn discard(&self) {
        self.registry.dispose_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================
