//! Repository for the `floorplans` table.

use heatvote_core::floorplan::DEFAULT_RADIUS;
use heatvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::floorplan::{CreateFloorplan, Floorplan, UpdateFloorplan};

/// Column list for `floorplans` queries.
const COLUMNS: &str = "id, name, image_url, radius, created_at, updated_at";

/// Provides CRUD operations for floor-plans.
pub struct FloorplanRepo;

impl FloorplanRepo {
    /// Insert a new floor-plan, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFloorplan) -> Result<Floorplan, sqlx::Error> {
        let query = format!(
            "INSERT INTO floorplans (name, image_url, radius) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Floorplan>(&query)
            .bind(&input.name)
            .bind(&input.image_url)
            .bind(input.radius.unwrap_or(DEFAULT_RADIUS))
            .fetch_one(pool)
            .await
    }

    /// Find a floor-plan by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Floorplan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM floorplans WHERE id = $1");
        sqlx::query_as::<_, Floorplan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The deployment's primary floor-plan: the one with the lowest id.
    pub async fn find_first(pool: &PgPool) -> Result<Option<Floorplan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM floorplans ORDER BY id ASC LIMIT 1");
        sqlx::query_as::<_, Floorplan>(&query)
            .fetch_optional(pool)
            .await
    }

    /// List all floor-plans ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Floorplan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM floorplans ORDER BY id ASC");
        sqlx::query_as::<_, Floorplan>(&query).fetch_all(pool).await
    }

    /// Update a floor-plan. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFloorplan,
    ) -> Result<Option<Floorplan>, sqlx::Error> {
        let query = format!(
            "UPDATE floorplans SET \
                 name = COALESCE($2, name), \
                 image_url = COALESCE($3, image_url), \
                 radius = COALESCE($4, radius), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Floorplan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image_url)
            .bind(input.radius)
            .fetch_optional(pool)
            .await
    }

    /// Delete a floor-plan; votes and thermostats cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM floorplans WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
