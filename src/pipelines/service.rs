// ============================================================================
// ripple-streams - Mocked Services
//
// The async collaborators the demo pipelines consume: each is a function
// from an input to a stream of one result, with latency simulated as a
// scheduled timer. No transport, no retries - any stand-in returning a
// source of a result type satisfies the pipelines.
// ============================================================================

use std::cell::Cell;
use std::time::Duration;

use crate::core::constants::{POSTS_LATENCY, SEARCH_LATENCY, USERS_LATENCY};
use crate::core::types::StreamError;
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::Stream;

// =============================================================================
// SEARCH
// =============================================================================

const FRUIT_CATALOG: [&str; 10] = [
    "Apple",
    "Apricot",
    "Banana",
    "Blueberry",
    "Cherry",
    "Grape",
    "Kiwi",
    "Mango",
    "Orange",
    "Peach",
];

/// Case-insensitive substring search over a static catalog, answering after
/// a simulated delay.
pub struct SearchService {
    scheduler: Scheduler,
    latency: Duration,
    calls: Cell<usize>,
}

impl SearchService {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_latency(scheduler, SEARCH_LATENCY)
    }

    pub fn with_latency(scheduler: &Scheduler, latency: Duration) -> Self {
        Self {
            scheduler: scheduler.clone(),
            latency,
            calls: Cell::new(0),
        }
    }

    pub fn search(&self, query: &str) -> Stream<Vec<String>> {
        self.calls.set(self.calls.get() + 1);

        if query.is_empty() {
            return Stream::once_on(&self.scheduler, Vec::new());
        }

        let needle = query.to_lowercase();
        let hits = FRUIT_CATALOG
            .iter()
            .filter(|candidate| candidate.to_lowercase().contains(&needle))
            .map(|candidate| candidate.to_string())
            .collect();

        Stream::once_after(&self.scheduler, self.latency, hits)
    }

    /// How many searches have been issued. The debounced pipeline's whole
    /// point is keeping this low.
    pub fn call_count(&self) -> usize {
        self.calls.get()
    }
}

// =============================================================================
// USERS
// =============================================================================

/// Mocked user-list fetch with a selectable failure branch. Success and
/// failure share the same latency.
pub struct UsersService {
    scheduler: Scheduler,
    latency: Duration,
}

impl UsersService {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            latency: USERS_LATENCY,
        }
    }

    pub fn fetch_users(&self, should_fail: bool) -> Stream<Vec<String>> {
        if should_fail {
            return Stream::fail_after(
                &self.scheduler,
                self.latency,
                StreamError::Service("Server temporarily unavailable. Try again.".into()),
            );
        }

        let users = ["Anurag", "Priya", "Rohan", "Sara", "Karan"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        Stream::once_after(&self.scheduler, self.latency, users)
    }
}

// =============================================================================
// POSTS
// =============================================================================

/// Canned response body for the posts fetch, shaped like the remote API's
/// JSON.
pub const POSTS_BODY: &str = r#"[
  {"id": 1, "title": "Understanding event streams"},
  {"id": 2, "title": "Backpressure for the rest of us"},
  {"id": 3, "title": "Debounce, throttle, and friends"},
  {"id": 4, "title": "Modeling request state"},
  {"id": 5, "title": "Cancellation as a first-class value"}
]"#;

/// Mocked fetch returning a raw JSON body after a simulated delay; decoding
/// is the pipeline's job, mirroring a data-task-plus-decode flow.
pub struct PostsService {
    scheduler: Scheduler,
    latency: Duration,
    body: String,
}

impl PostsService {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_body(scheduler, POSTS_BODY)
    }

    /// Fetch an arbitrary body - the hook tests use to exercise the decode
    /// failure path.
    pub fn with_body(scheduler: &Scheduler, body: &str) -> Self {
        Self {
            scheduler: scheduler.clone(),
            latency: POSTS_LATENCY,
            body: body.to_string(),
        }
    }

    pub fn fetch_posts(&self) -> Stream<String> {
        Stream::once_after(&self.scheduler, self.latency, self.body.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::stream::Observable;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn search_matches_case_insensitively() {
        let scheduler = Scheduler::new();
        let service = SearchService::new(&scheduler);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = service.search("AP").observe({
            let seen = seen.clone();
            move |v: &Vec<String>| seen.borrow_mut().push(v.clone())
        });

        scheduler.advance(SEARCH_LATENCY);
        assert_eq!(
            *seen.borrow(),
            vec![vec![
                "Apple".to_string(),
                "Apricot".to_string(),
                "Grape".to_string()
            ]]
        );
        assert_eq!(service.call_count(), 1);
    }

    #[test]
    fn empty_query_answers_without_latency() {
        let scheduler = Scheduler::new();
        let service = SearchService::new(&scheduler);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = service.search("").observe({
            let seen = seen.clone();
            move |v: &Vec<String>| seen.borrow_mut().push(v.clone())
        });

        scheduler.run_until_idle();
        assert_eq!(*seen.borrow(), vec![Vec::<String>::new()]);
    }

    #[test]
    fn users_failure_branch_fails_with_the_service_error() {
        let scheduler = Scheduler::new();
        let service = UsersService::new(&scheduler);

        let failed = Rc::new(RefCell::new(None));
        let _sub = service.fetch_users(true).observe_events({
            let failed = failed.clone();
            move |ev| {
                if let crate::core::types::Event::Error(err) = ev {
                    *failed.borrow_mut() = Some(err.clone());
                }
            }
        });

        scheduler.advance(USERS_LATENCY);
        assert_eq!(
            *failed.borrow(),
            Some(StreamError::Service(
                "Server temporarily unavailable. Try again.".into()
            ))
        );
    }
}
