// Core algorithm exports
pub mod discovery;
pub mod distance;
pub mod filters;
pub mod scoring;
pub mod swipe;

pub use discovery::{DiscoveryError, ProfileDirectory};
pub use distance::{annotate_distances, distance, sort_by_distance};
pub use filters::{AgeBounds, DiscoveryFilters, FilterClause};
pub use scoring::{likability_delta, LikabilityScorer};
pub use swipe::{next_transition, SwipeCommand, SwipeEngine, SwipeError, Transition};
