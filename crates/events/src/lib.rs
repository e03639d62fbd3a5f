//! Heatvote live vote fan-out.
//!
//! - [`BroadcastHub`] -- per-floor-plan subscriber sets with ordered,
//!   best-effort, fire-and-forget delivery.
//! - [`VoteBroadcast`] -- the public payload pushed for each accepted vote.
//!
//! The hub knows nothing about clustering: subscribers receive raw votes and
//! re-run the clustering engine themselves. A subscriber that reconnects
//! gets no replay and must pull the current vote set separately.

pub mod hub;

pub use hub::{BroadcastHub, HubMessage, SubscriberId, Subscription, VoteBroadcast};
