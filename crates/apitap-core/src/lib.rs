//! Shared kernel for the apitap workspace: error taxonomy, process
//! configuration, and timestamp helpers used by every other crate.

pub mod config;
pub mod error;
pub mod time;

pub use config::ApitapConfig;
pub use error::{ApitapError, Result};
