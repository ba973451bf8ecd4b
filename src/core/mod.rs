// ============================================================================
// ripple-streams - Core Module
// Events, errors, and observer bookkeeping shared by every source
// ============================================================================

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use types::{Event, EventFn, ObserverId, SourceCore, StreamError};
