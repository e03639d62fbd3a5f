use std::sync::Arc;

use heatvote_db::RecordStore;
use heatvote_events::BroadcastHub;

use crate::config::ServerConfig;
use crate::engine::VoteIngest;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Durable record store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn RecordStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live vote fan-out to WebSocket subscribers.
    pub hub: Arc<BroadcastHub>,
    /// Vote acceptance pipeline (rate limiting, sequencing, publish).
    pub ingest: Arc<VoteIngest>,
}

impl AppState {
    /// Wire up state from a store and configuration.
    pub fn new(store: Arc<dyn RecordStore>, config: ServerConfig) -> Self {
        let ingest = VoteIngest::new(config.rate_limiter());
        Self {
            store,
            config: Arc::new(config),
            hub: Arc::new(BroadcastHub::new()),
            ingest: Arc::new(ingest),
        }
    }
}
