//! Request extractors.

pub mod visitor;
