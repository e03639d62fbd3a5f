//! WebSocket transport for live vote subscriptions.
//!
//! Provides the HTTP upgrade handler that attaches a socket to the
//! [`BroadcastHub`](heatvote_events::BroadcastHub) and the heartbeat task
//! that keeps idle connections alive.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
