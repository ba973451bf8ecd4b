// ============================================================================
// ripple-streams - Posts Pipeline
//
// Mocked fetch -> decode -> main context -> request state. The decode stage
// is fallible: a malformed body becomes the terminal error of that request,
// surfaced as a Failed state like any service error.
// ============================================================================

use serde::Deserialize;

use crate::core::types::{Event, StreamError};
use crate::pipelines::service::PostsService;
use crate::pipelines::state_flow::RequestState;
use crate::primitives::registry::Registry;
use crate::primitives::slot::{slot, Slot};
use crate::reactivity::scheduling::Scheduler;
use crate::reactivity::stream::{Observable, StreamOps};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
}

pub struct PostsModel {
    pub state: Slot<RequestState<Vec<Post>>>,
    service: PostsService,
    scheduler: Scheduler,
    registry: Registry,
}

impl PostsModel {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_service(scheduler, PostsService::new(scheduler))
    }

    pub fn with_service(scheduler: &Scheduler, service: PostsService) -> Self {
        Self {
            state: slot(RequestState::Idle),
            service,
            scheduler: scheduler.clone(),
            registry: Registry::new(),
        }
    }

    pub fn load_posts(&self) {
        self.state.set(RequestState::Loading);

        self.service
            .fetch_posts()
            .try_map(|body: &String| {
                serde_json::from_str::<Vec<Post>>(body)
                    .map_err(|err| StreamError::Decode(err.to_string()))
            })
            .deliver_on(&self.scheduler)
            .observe_events({
                let state = self.state.clone();
                move |event| match event {
                    Event::Next(posts) => state.set(RequestState::Loaded(posts.clone())),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::POSTS_LATENCY;

    #[test]
    fn fetch_decodes_into_posts() {
        let scheduler = Scheduler::new();
        let model = PostsModel::new(&scheduler);

        model.load_posts();
        assert!(model.state.current().is_loading());

        scheduler.advance(POSTS_LATENCY);
        let state = model.state.current();
        let posts = state.value().expect("posts decoded");
        assert_eq!(posts.len(), 5);
        assert_eq!(
            posts[0],
            Post {
                id: 1,
                title: "Understanding event streams".to_string()
            }
        );
    }

    #[test]
    fn malformed_body_surfaces_as_a_decode_failure() {
        let scheduler = Scheduler::new();
        let service = PostsService::with_body(&scheduler, "{ not json ]");
        let model = PostsModel::with_service(&scheduler, service);

        model.load_posts();
        scheduler.advance(POSTS_LATENCY);

        let state = model.state.current();
        assert!(matches!(
            state.error(),
            Some(StreamError::Decode(_))
        ));
        assert!(state.value().is_none());
    }
}
