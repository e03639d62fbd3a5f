//! Vote acceptance engine.
//!
//! The ingestion boundary between HTTP handlers, the record store, and the
//! broadcast hub. Handlers resolve identity and parse input; everything from
//! validation to live fan-out happens in [`ingest`].

pub mod ingest;

pub use ingest::{VoteIngest, VoteSubmission};
