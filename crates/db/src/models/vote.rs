//! Vote entity model and DTOs.

use heatvote_core::types::{DbId, Timestamp};
use heatvote_core::vote::{Sentiment, VoteSample};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `votes` table. Immutable once inserted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub floorplan_id: DbId,
    pub visitor_id: String,
    pub ip_address: Option<String>,
    pub x: i32,
    pub y: i32,
    pub value: i16,
    pub created_at: Timestamp,
}

impl Vote {
    /// The fields the clustering engine reads. `None` if the stored value is
    /// not a valid sentiment code.
    pub fn sample(&self) -> Option<VoteSample> {
        Sentiment::from_code(self.value)
            .ok()
            .map(|sentiment| VoteSample {
                x: self.x,
                y: self.y,
                sentiment,
                created_at: self.created_at,
            })
    }

    /// The fields safe to show to every viewer.
    pub fn public(&self) -> PublicVote {
        PublicVote {
            id: self.id,
            x: self.x,
            y: self.y,
            value: self.value,
            created_at: self.created_at,
        }
    }
}

/// Public projection of a vote: no visitor identity or network address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicVote {
    pub id: DbId,
    pub x: i32,
    pub y: i32,
    pub value: i16,
    pub created_at: Timestamp,
}

/// A validated vote ready to be appended.
#[derive(Debug, Clone)]
pub struct NewVote {
    pub floorplan_id: DbId,
    pub visitor_id: String,
    pub ip_address: Option<String>,
    pub x: i32,
    pub y: i32,
    pub value: i16,
    pub created_at: Timestamp,
}
