//! CLI surface for apitap (spec §6), exposed as a library so `main.rs` stays
//! a thin entry point and tests can drive `Cli::try_parse_from` directly.

pub mod cli;

pub use cli::Cli;
