//! Replay only needs the snapshot half of the generator's schema logic, to
//! diff a live response against the stored `responseSchema`.

pub use apitap_generator::schema_snapshot::snapshot;
