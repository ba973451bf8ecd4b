// ============================================================================
// ripple-streams - Demo Pipelines
// The catalog's view-models: each owns its input sources, its output slots,
// and the registry holding its subscriptions
// ============================================================================

pub mod basics;
pub mod counter;
pub mod form;
pub mod posts;
pub mod search;
pub mod service;
pub mod state_flow;

pub use basics::BasicsModel;
pub use counter::CounterModel;
pub use form::FormModel;
pub use posts::{Post, PostsModel};
pub use search::SearchModel;
pub use service::{PostsService, SearchService, UsersService};
pub use state_flow::{RequestState, UsersModel};
