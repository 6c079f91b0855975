//! Encrypted-at-rest credential store (component C3, spec §3 / §4.3).

pub mod domain;
pub mod store;
pub mod types;

pub use domain::fallback_candidates;
pub use store::CredentialStore;
pub use types::*;
