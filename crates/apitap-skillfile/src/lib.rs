//! Skill file data model and signed, atomic per-domain store.
//!
//! Covers the `SkillFile` part of spec §3 and the store half of component
//! C4 (the generator that *produces* skill files lives in
//! `apitap-generator`).

pub mod canonical;
pub mod store;
pub mod types;

pub use canonical::canonical_bytes;
pub use store::SkillFileStore;
pub use types::*;
