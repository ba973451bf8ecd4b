// ============================================================================
// ripple-streams - Constants
// Tuning constants shared across the runtime and the demo pipelines
// ============================================================================

use std::time::Duration;

// =============================================================================
// SCHEDULER
// =============================================================================

/// Maximum queue-drain iterations before we consider it an infinite loop.
///
/// A task posted to the main context may post further tasks; a task that
/// keeps re-posting itself would otherwise spin forever inside
/// `run_until_idle`.
pub const MAX_DRAIN_COUNT: u32 = 1000;

// =============================================================================
// SOURCES
// =============================================================================

/// Initial capacity of a source's observer list.
///
/// Most demo sources have one or two observers; four avoids the common
/// reallocation without over-reserving.
pub const INITIAL_OBSERVER_CAPACITY: usize = 4;

// =============================================================================
// DEMO PIPELINE TIMINGS
// =============================================================================

/// Quiet period the debounced-search pipeline waits after the last keystroke.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(400);

/// Simulated latency of the mocked search service.
pub const SEARCH_LATENCY: Duration = Duration::from_millis(250);

/// Simulated latency of the mocked users service (success and failure alike).
pub const USERS_LATENCY: Duration = Duration::from_millis(700);

/// Simulated latency of the mocked posts fetch.
pub const POSTS_LATENCY: Duration = Duration::from_millis(700);

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_guard_is_reasonable() {
        assert!(MAX_DRAIN_COUNT >= 100);
    }

    #[test]
    fn search_latency_shorter_than_quiet_period() {
        // The demo catalog relies on the debounce window dominating the
        // request latency so typing never races a stale response.
        assert!(SEARCH_LATENCY < SEARCH_QUIET_PERIOD);
    }
}
