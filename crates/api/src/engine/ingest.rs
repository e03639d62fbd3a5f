//! Vote submission pipeline.
//!
//! Order of operations for one submission:
//!
//! 1. Validate sentiment code, coordinates and visitor id.
//! 2. Check the floor-plan exists.
//! 3. Per-address throttle.
//! 4. Take the (floor-plan, visitor) lock, read the visitor's latest vote,
//!    and apply the cooldown.
//! 5. Take the floor-plan sequencing lock, append the vote, publish it.
//!
//! The identity lock is held until the append completes so two concurrent
//! submissions from one visitor can never both pass the cooldown. The
//! sequencing lock spans append and publish so subscribers see votes in the
//! same order the store accepted them.

use chrono::Utc;
use heatvote_core::error::CoreError;
use heatvote_core::rate_limit::{KeyedLocks, RateLimiter};
use heatvote_core::types::{DbId, Timestamp};
use heatvote_core::vote::{validate_coordinates, validate_visitor_id, Sentiment};
use heatvote_db::models::vote::{NewVote, Vote};
use heatvote_db::RecordStore;
use heatvote_events::{BroadcastHub, VoteBroadcast};

use crate::error::AppResult;

/// A vote as received from the boundary, identity already resolved.
#[derive(Debug, Clone)]
pub struct VoteSubmission {
    pub floorplan_id: DbId,
    pub visitor_id: String,
    pub ip_address: Option<String>,
    pub x: i32,
    pub y: i32,
    pub value: i16,
}

/// Shared vote acceptance state: rate limiting plus per-floor-plan sequencing.
pub struct VoteIngest {
    limiter: RateLimiter,
    sequencing: KeyedLocks<DbId>,
}

impl VoteIngest {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            limiter,
            sequencing: KeyedLocks::new(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Accept a vote at wall-clock time.
    pub async fn submit_vote(
        &self,
        store: &dyn RecordStore,
        hub: &BroadcastHub,
        submission: VoteSubmission,
    ) -> AppResult<Vote> {
        self.submit_with_clock(store, hub, submission, Utc::now)
            .await
    }

    /// Accept a vote, reading the current time from `clock`.
    ///
    /// The clock is read once for the rate-limit checks and once more, under
    /// the sequencing lock, for the stored creation time.
    pub async fn submit_with_clock<C>(
        &self,
        store: &dyn RecordStore,
        hub: &BroadcastHub,
        submission: VoteSubmission,
        clock: C,
    ) -> AppResult<Vote>
    where
        C: Fn() -> Timestamp + Send + Sync,
    {
        let VoteSubmission {
            floorplan_id,
            visitor_id,
            ip_address,
            x,
            y,
            value,
        } = submission;

        let sentiment = Sentiment::from_code(value)?;
        validate_coordinates(x, y)?;
        validate_visitor_id(&visitor_id)?;

        if store.find_floorplan(floorplan_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Floorplan",
                id: floorplan_id,
            }
            .into());
        }

        if let Some(address) = ip_address.as_deref() {
            if let Err(e) = self.limiter.check_address(address, clock()) {
                tracing::info!(floorplan_id, ip = %address, "Vote throttled by address");
                return Err(e.into());
            }
        }

        let _identity = self.limiter.acquire(floorplan_id, &visitor_id).await;

        if self.limiter.is_enabled() {
            let last = store
                .latest_vote_by_visitor(floorplan_id, &visitor_id)
                .await?;
            if let Err(e) = self
                .limiter
                .check_cooldown(last.map(|v| v.created_at), clock())
            {
                tracing::info!(floorplan_id, visitor_id = %visitor_id, "Vote inside cooldown");
                return Err(e.into());
            }
        }

        let _sequence = self.sequencing.lock(floorplan_id).await;

        let vote = store
            .insert_vote(&NewVote {
                floorplan_id,
                visitor_id,
                ip_address,
                x,
                y,
                value: sentiment.code(),
                created_at: clock(),
            })
            .await?;

        let delivered = hub.publish(VoteBroadcast::from(&vote)).await;

        tracing::info!(
            vote_id = vote.id,
            floorplan_id,
            visitor_id = %vote.visitor_id,
            value = vote.value,
            delivered,
            "Vote accepted"
        );

        Ok(vote)
    }

    /// Release idle limiter and lock bookkeeping.
    pub fn cleanup(&self, now: Timestamp) {
        self.limiter.cleanup(now);
        self.sequencing.prune();
    }
}
