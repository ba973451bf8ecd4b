// ============================================================================
// ripple-streams - Debounced Search Pipeline
//
// Debounce waits out the typing burst; dedup avoids repeated requests;
// flat_map_latest cancels a stale request the moment a newer query fires.
// An empty trimmed query short-circuits to an empty result without touching
// the service.
// ============================================================================

use std::rc::Rc;

use crate::core::constants::SEARCH_QUIET_PERIOD;
use crate::pipelines::service::SearchService;
use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, Stream, StreamOps};

pub struct SearchModel {
    pub query: Slot<String>,
    pub results: Slot<Vec<String>>,
    pub is_searching: Slot<bool>,
    pub service: Rc<SearchService>,
    registry: Registry,
}

impl SearchModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_service(scheduler, SearchService::new(scheduler))
    }

    pub fn with_service(scheduler: &Scheduler, service: SearchService) -> Self {
        let query = slot(String::new());
        let results = slot(Vec::new());
        let is_searching = slot(false);
        let service = Rc::new(service);
        let registry = Registry::new();

        query
            .map(|raw: &String| raw.trim().to_string())
            .debounce(SEARCH_QUIET_PERIOD, scheduler)
            .dedup()
            .tap({
                let is_searching = is_searching.clone();
                move |text: &String| is_searching.set(!text.is_empty())
            })
            .flat_map_latest({
                let service = service.clone();
                let scheduler = scheduler.clone();
                move |text: &String| {
                    if text.is_empty() {
                        // Never hits the service: an empty query is an
                        // immediate empty result.
                        Stream::once_on(&scheduler, Vec::new())
                    } else {
                        service.search(text)
                    }
                }
            })
            .deliver_on(scheduler)
            .observe({
                let results = results.clone();
                let is_searching = is_searching.clone();
                move |hits: &Vec<String>| {
                    results.set(hits.clone());
                    is_searching.set(false);
                }
            })
            .store_in(&registry);

        Self {
            query,
            results,
            is_searching,
            service,
            registry,
        }
    }

    pub fn discard(&self) {
        self.registry.dispose_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================
