// ============================================================================
// ripple-streams - Primitives Module
// User-facing sources and lifetime handles: emitter, slot, subscription,
// registry
// ============================================================================

pub mod emitter;
pub mod registry;
pub mod slot;
pub mod subscription;

// Re-export the primary types
pub use emitter::{emitter, Emitter};
pub use registry::Registry;
pub use slot::{slot, Slot};
pub use subscription::Subscription;
