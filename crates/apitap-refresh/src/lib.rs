//! Refresh orchestration (component C7, spec §4.6).

pub mod browser;
pub mod guard;
pub mod oauth;
pub mod orchestrator;

pub use browser::BrowserSession;
pub use guard::RefreshGuard;
pub use orchestrator::{RefreshOrchestrator, RefreshOutcome};
