// ============================================================================
// ripple-streams - Reactivity Module
// Operator stages, scheduling, and equality helpers
// ============================================================================

pub mod combine;
pub mod debounce;
pub mod equality;
pub mod operators;
pub mod scheduling;
pub mod stream;
pub mod switching;

// Re-export the primary surface
pub use combine::{combine_latest, merge};
pub use equality::{by_key, equals, safe_equals_f32, safe_equals_f64};
pub use scheduling::{Scheduler, TimerHandle};
pub use stream::{Observable, Stream, StreamOps};
