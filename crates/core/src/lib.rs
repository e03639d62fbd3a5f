//! Heatvote domain logic.
//!
//! Everything in this crate is pure or purely in-memory: it operates on
//! records that have already been fetched from the record store.
//!
//! - [`decay`] -- exponential half-life weighting of a vote by age.
//! - [`clustering`] -- greedy first-fit proximity clustering of weighted votes.
//! - [`time_travel`] -- cluster evaluation against an arbitrary reference time.
//! - [`rate_limit`] -- per-identity cooldown, per-address throttle, keyed locks.
//! - [`thermostat`] -- point-device setting validation and "as of" resolution.

pub mod clustering;
pub mod decay;
pub mod error;
pub mod floorplan;
pub mod rate_limit;
pub mod thermostat;
pub mod time_travel;
pub mod types;
pub mod vote;
