// ============================================================================
// ripple-streams - Publisher Basics Pipeline
//
// The hello-world of the catalog: an emitter feeds a map stage into a
// message log, another feeds filter + map into a caption. Source emits,
// operators transform, observer receives.
// ============================================================================

use crate::primitives::emitter::{emitter, Emitter};
use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, StreamOps};

pub struct BasicsModel {
    pub announcements: Emitter<String>,
    pub numbers: Emitter<i32>,
    pub edited_messages: Slot<Vec<String>>,
    pub latest_even_number: Slot<String>,
    registry: Registry,
}

impl BasicsModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        let announcements = emitter();
        let numbers = emitter();
        let edited_messages = slot(Vec::new());
        let latest_even_number = slot(String::from("None"));
        let registry = Registry::new();

        announcements
            .map(|message: &String| format!("[Edited] {message}"))
            .deliver_on(scheduler)
            .observe({
                let edited_messages = edited_messages.clone();
                move |message: &String| {
                    let message = message.clone();
                    edited_messages.update(|log| log.insert(0, message));
                }
            })
            .store_in(&registry);

        numbers
            .filter(|n: &i32| n % 2 == 0)
            .map(|n: &i32| format!("Even: {n}"))
            .deliver_on(scheduler)
            .observe({
                let latest_even_number = latest_even_number.clone();
                move |caption: &String| latest_even_number.set(caption.clone())
            })
            .store_in(&registry);

        Self {
            announcements,
            numbers,
            edited_messages,
            latest_even_number,
            registry,
        }
    }

    /// Trim and forward an announcement; blank input is ignored.
    pub fn send_announcement(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.announcements.emit(trimmed.to_string());
    }

    pub fn push_number(&self, n: i32) {
        self.numbers.emit(n);
    }

    pub fn discard(&self) {
        self.registry.dispose_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================
