//! Repository for the append-only `votes` table.

use heatvote_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::vote::{NewVote, Vote};

/// Column list for `votes` queries.
const COLUMNS: &str = "id, floorplan_id, visitor_id, ip_address, x, y, value, created_at";

/// Append and read operations for votes. Votes are never updated.
pub struct VoteRepo;

impl VoteRepo {
    /// Append a vote, returning the stored row.
    pub async fn insert(pool: &PgPool, vote: &NewVote) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "INSERT INTO votes (floorplan_id, visitor_id, ip_address, x, y, value, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(vote.floorplan_id)
            .bind(&vote.visitor_id)
            .bind(&vote.ip_address)
            .bind(vote.x)
            .bind(vote.y)
            .bind(vote.value)
            .bind(vote.created_at)
            .fetch_one(pool)
            .await
    }

    /// Votes for a floor-plan in creation order, optionally only those
    /// created at or after `since`.
    pub async fn list_by_floorplan(
        pool: &PgPool,
        floorplan_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes \
             WHERE floorplan_id = $1 \
               AND ($2::timestamptz IS NULL OR created_at >= $2) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(floorplan_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// The most recent vote from `visitor_id` on a floor-plan.
    pub async fn latest_by_visitor(
        pool: &PgPool,
        floorplan_id: DbId,
        visitor_id: &str,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes \
             WHERE floorplan_id = $1 AND visitor_id = $2 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(floorplan_id)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }
}
