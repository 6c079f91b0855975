//! Replay engine (component C8, spec §4.7).

pub mod batch;
pub mod decode;
pub mod diff;
pub mod engine;
pub mod resolve;
pub mod schema_adapter;
pub mod truncate;

pub use batch::{replay_batch, BatchOutcome, BatchRequest};
pub use engine::{ReplayEngine, ReplayOptions, ReplayResult};
