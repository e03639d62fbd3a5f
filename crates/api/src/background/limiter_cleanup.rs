//! Periodic pruning of rate-limiter bookkeeping.
//!
//! The per-address windows and per-key locks are created on demand; this
//! job drops the ones that have gone idle so memory tracks active visitors
//! rather than every visitor ever seen.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::engine::VoteIngest;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(ingest: Arc<VoteIngest>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Rate limiter cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limiter cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                ingest.cleanup(Utc::now());
                tracing::debug!("Rate limiter bookkeeping pruned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatvote_core::rate_limit::RateLimiter;

    #[tokio::test]
    async fn stops_when_cancelled() {
        let ingest = Arc::new(VoteIngest::new(RateLimiter::default()));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(ingest, cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("cleanup job did not stop")
            .unwrap();
    }
}
