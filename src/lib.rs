// ============================================================================
// ripple-streams - A Reactive Stream Library for Rust
// ============================================================================
//
// Push-based event pipelines for UI state: hot emitters, stateful slots,
// composable operator stages, and a single serializing delivery context.
// The pipelines module holds the demo catalog's view-models, built purely
// from the primitives here.
// ============================================================================

pub mod core;
pub mod pipelines;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use self::core::constants;
pub use self::core::types::{Event, SourceCore, StreamError};

// Re-export primitives at crate root
pub use primitives::emitter::{emitter, Emitter};
pub use primitives::registry::Registry;
pub use primitives::slot::{slot, Slot};
pub use primitives::subscription::Subscription;

// Re-export the reactivity surface
pub use reactivity::combine::{combine_latest, merge};
pub use reactivity::equality::{by_key, equals, safe_equals_f32, safe_equals_f64};
pub use reactivity::scheduling::{Scheduler, TimerHandle};
pub use reactivity::stream::{Observable, Stream, StreamOps};

// Re-export the demo pipelines
pub use pipelines::{
    BasicsModel, CounterModel, FormModel, Post, PostsModel, RequestState, SearchModel, UsersModel,
};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    // =========================================================================
    // Source contracts
    // =========================================================================

    #[test]
    fn emitter_observers_see_exactly_the_events_after_registration() {
        let source = emitter();
        let early = Rc::new(RefCell::new(Vec::new()));
        let late = Rc::new(RefCell::new(Vec::new()));

        let _a = source.observe({
            let early = early.clone();
            move |v: &i32| early.borrow_mut().push(*v)
        });

        source.emit(1);
        source.emit(2);

        let _b = source.observe({
            let late = late.clone();
            move |v: &i32| late.borrow_mut().push(*v)
        });

        source.emit(3);

        assert_eq!(*early.borrow(), vec![1, 2, 3]);
        assert_eq!(*late.borrow(), vec![3]);
    }

    #[test]
    fn slot_first_notification_is_always_the_current_value() {
        let cell = slot(10);
        cell.set(20);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = cell.observe({
            let seen = seen.clone();
            move |v: &i32| seen.borrow_mut().push(*v)
        });

        assert_eq!(*seen.borrow(), vec![20]);
    }

    // =========================================================================
    // Scenario: counter
    // =========================================================================

    #[test]
    fn counter_delivers_one_two_one() {
        let scheduler = Scheduler::new();
        let model = CounterModel::new(&scheduler);

        let delivered = Rc::new(RefCell::new(Vec::new()));
        let _sub = model.count.observe({
            let delivered = delivered.clone();
            move |v: &i32| delivered.borrow_mut().push(*v)
        });

        model.increment.emit(());
        model.increment.emit(());
        model.decrement.emit(());
        scheduler.run_until_idle();

        // Initial replay of 0, then the pipeline's 1, 2, 1.
        assert_eq!(*delivered.borrow(), vec![0, 1, 2, 1]);
    }

    // =========================================================================
    // Scenario: form validation
    // =========================================================================

    #[test]
    fn form_validity_flips_once_when_both_fields_become_valid() {
        let scheduler = Scheduler::new();
        let model = FormModel::new(&scheduler);
        scheduler.run_until_idle();

        model.email.set("a@b.com".to_string());
        scheduler.run_until_idle();
        assert!(!model.can_submit.current());

        model.password.set("short".to_string());
        scheduler.run_until_idle();
        assert!(!model.can_submit.current());

        let delivered = Rc::new(RefCell::new(Vec::new()));
        let _sub = model.can_submit.observe({
            let delivered = delivered.clone();
            move |ok: &bool| delivered.borrow_mut().push(*ok)
        });

        model.password.set("longenough1".to_string());
        scheduler.run_until_idle();

        assert!(model.can_submit.current());
        // Replay of false, then the single flip to true.
        assert_eq!(*delivered.borrow(), vec![false, true]);
    }

    // =========================================================================
    // Scenario: debounced search timing
    // =========================================================================

    #[test]
    fn debounced_search_fires_once_at_the_right_time() {
        let scheduler = Scheduler::new();
        let model = SearchModel::new(&scheduler);

        let deliveries = Rc::new(RefCell::new(Vec::new()));
        let _sub = model.results.observe({
            let deliveries = deliveries.clone();
            let scheduler = scheduler.clone();
            move |hits: &Vec<String>| {
                deliveries.borrow_mut().push((scheduler.now(), hits.clone()));
            }
        });

        // "ap" at t=0, "app" at t=100ms.
        model.query.set("ap".to_string());
        scheduler.advance(Duration::from_millis(100));
        model.query.set("app".to_string());

        scheduler.advance(Duration::from_millis(1000));

        let deliveries = deliveries.borrow();
        // Replay of the empty results, then exactly one search result:
        // the debounce fired at t=500, the service answered 250ms later.
        assert_eq!(deliveries.len(), 2);
        assert_eq!(
            deliveries[1],
            (Duration::from_millis(750), vec!["Apple".to_string()])
        );
        assert_eq!(model.service.call_count(), 1);
    }

    // =========================================================================
    // Scenario: async state flow
    // =========================================================================

    #[test]
    fn failing_request_reports_loading_then_failure_only() {
        let scheduler = Scheduler::new();
        let model = UsersModel::new(&scheduler);
        model.simulate_failure.set(true);

        let states = Rc::new(RefCell::new(Vec::new()));
        let _sub = model.state.observe({
            let states = states.clone();
            move |s: &RequestState<Vec<String>>| states.borrow_mut().push(s.clone())
        });

        model.load_users();
        scheduler.advance(constants::USERS_LATENCY);

        let states = states.borrow();
        assert_eq!(states[0], RequestState::Idle);
        assert_eq!(states[1], RequestState::Loading);
        assert!(matches!(states[2], RequestState::Failed(_)));
        assert_eq!(states.len(), 3);
    }

    // =========================================================================
    // Registry lifetime
    // =========================================================================

    #[test]
    fn disposing_a_registry_severs_every_pipeline_it_owns() {
        let scheduler = Scheduler::new();
        let source = emitter();
        let sink = slot(0);
        let registry = Registry::new();

        source
            .map(|v: &i32| v * 2)
            .deliver_on(&scheduler)
            .observe({
                let sink = sink.clone();
                move |v: &i32| sink.set(*v)
            })
            .store_in(&registry);

        source.emit(1);
        scheduler.run_until_idle();
        assert_eq!(sink.current(), 2);

        registry.dispose_all();
        source.emit(5);
        scheduler.run_until_idle();
        assert_eq!(sink.current(), 2);
        assert_eq!(source.observer_count(), 0);
    }
}
