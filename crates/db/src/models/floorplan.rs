//! Floor-plan entity model and DTOs.

use heatvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `floorplans` table.
///
/// `radius` governs both the drawn size of a single vote and the clustering
/// grouping radius.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Floorplan {
    pub id: DbId,
    pub name: String,
    pub image_url: Option<String>,
    pub radius: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a floor-plan. `radius` defaults to 50.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFloorplan {
    pub name: String,
    pub image_url: Option<String>,
    pub radius: Option<i32>,
}

/// DTO for updating a floor-plan. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFloorplan {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub radius: Option<i32>,
}
