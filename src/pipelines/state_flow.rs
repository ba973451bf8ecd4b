// ============================================================================
// ripple-streams - Async State Flow Pipeline
//
// User action -> loading -> pipeline -> loaded or failed. The request state
// is one enum, so success and failure are mutually exclusive by
// construction - there is no way to set both, or neither.
// ============================================================================

use tracing::debug;

use crate::core::types::Event;
use crate::core::types::StreamError;
use crate::pipelines::service::UsersService;
use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, StreamOps};

// =============================================================================
// REQUEST STATE
// =============================================================================

/// Lifecycle of one request, as the UI observes it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    /// No request issued yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The request finished with a value.
    Loaded(T),
    /// The request finished with an error.
    Failed(StreamError),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RequestState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StreamError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// USERS MODEL
// =============================================================================

pub struct UsersModel {
    pub simulate_failure: Slot<bool>,
    pub state: Slot<RequestState<Vec<String>>>,
    service: UsersService,
    scheduler: Scheduler,
    registry: Registry,
}

impl UsersModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            simulate_failure: slot(false),
            state: slot(RequestState::Idle),
            service: UsersService::new(scheduler),
            scheduler: scheduler.clone(),
            registry: Registry::new(),
        }
    }

    /// Issue the mocked fetch. Loading is visible immediately; the outcome
    /// arrives through the scheduler once the simulated latency elapses.
    pub fn load_users(&self) {
        let should_fail = self.simulate_failure.current();
        debug!(should_fail, "loading users");
        self.state.set(RequestState::Loading);

        self.service
            .fetch_users(should_fail)
            .deliver_on(&self.scheduler)
            .observe_events({
                let state = self.state.clone();
                move |event| match event {
                    Event::Next(users) => state.set(RequestState::Loaded(users.clone())),
                    Event::Error(err) => state.set(RequestState::Failed(err.clone())),
                    Event::Complete => {}
                }
            })
            .store_in(&self.registry);
    }

    pub fn discard(&self) {
        self.registry.dispose_all();
    }
}

// =============================================================================
// TESTS
// =============================================================================
