//! Skill generation and live verification (components C5, C6).

pub mod auth;
pub mod body_template;
pub mod body_vars;
pub mod captcha;
pub mod entropy;
pub mod exchange;
pub mod generator;
pub mod pagination;
pub mod parameterize;
pub mod replayability;
pub mod schema_snapshot;
pub mod verifier;

pub use exchange::Exchange;
pub use generator::generate;
pub use verifier::{verify, VerificationOutcome};
