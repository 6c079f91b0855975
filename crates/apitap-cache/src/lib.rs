//! Session cache and browse orchestrator (components C9, C10, spec §4.8).

pub mod adapters;
pub mod browse;
pub mod cache;

pub use adapters::{ContentReaderAdapter, DiscoveryAdapter, DiscoveryConfidence, DiscoveryResult};
pub use browse::{best_endpoint, BrowseFailure, BrowseOrchestrator};
pub use cache::SessionCache;
