//! Repositories for the `thermostats` and `thermostat_settings` tables.

use heatvote_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::thermostat::{
    CreateThermostat, NewThermostatSetting, Thermostat, ThermostatSetting, UpdateThermostat,
};

/// Column list for `thermostats` queries.
const THERMOSTAT_COLUMNS: &str = "id, floorplan_id, name, x, y, created_at, updated_at";

/// Column list for `thermostat_settings` queries.
const SETTING_COLUMNS: &str = "id, thermostat_id, temperature, author, created_at";

// ---------------------------------------------------------------------------
// ThermostatRepo
// ---------------------------------------------------------------------------

/// CRUD operations for thermostats.
pub struct ThermostatRepo;

impl ThermostatRepo {
    pub async fn create(
        pool: &PgPool,
        floorplan_id: DbId,
        input: &CreateThermostat,
    ) -> Result<Thermostat, sqlx::Error> {
        let query = format!(
            "INSERT INTO thermostats (floorplan_id, name, x, y) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {THERMOSTAT_COLUMNS}"
        );
        sqlx::query_as::<_, Thermostat>(&query)
            .bind(floorplan_id)
            .bind(&input.name)
            .bind(input.x)
            .bind(input.y)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Thermostat>, sqlx::Error> {
        let query = format!("SELECT {THERMOSTAT_COLUMNS} FROM thermostats WHERE id = $1");
        sqlx::query_as::<_, Thermostat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_floorplan(
        pool: &PgPool,
        floorplan_id: DbId,
    ) -> Result<Vec<Thermostat>, sqlx::Error> {
        let query = format!(
            "SELECT {THERMOSTAT_COLUMNS} FROM thermostats \
             WHERE floorplan_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, Thermostat>(&query)
            .bind(floorplan_id)
            .fetch_all(pool)
            .await
    }

    /// Update a thermostat. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateThermostat,
    ) -> Result<Option<Thermostat>, sqlx::Error> {
        let query = format!(
            "UPDATE thermostats SET \
                 name = COALESCE($2, name), \
                 x = COALESCE($3, x), \
                 y = COALESCE($4, y), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {THERMOSTAT_COLUMNS}"
        );
        sqlx::query_as::<_, Thermostat>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.x)
            .bind(input.y)
            .fetch_optional(pool)
            .await
    }

    /// Delete a thermostat; its settings cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM thermostats WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// ThermostatSettingRepo
// ---------------------------------------------------------------------------

/// Append and point-in-time reads for the settings log.
pub struct ThermostatSettingRepo;

impl ThermostatSettingRepo {
    pub async fn insert(
        pool: &PgPool,
        setting: &NewThermostatSetting,
    ) -> Result<ThermostatSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO thermostat_settings (thermostat_id, temperature, author, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SETTING_COLUMNS}"
        );
        sqlx::query_as::<_, ThermostatSetting>(&query)
            .bind(setting.thermostat_id)
            .bind(setting.temperature)
            .bind(&setting.author)
            .bind(setting.created_at)
            .fetch_one(pool)
            .await
    }

    /// Full log for a thermostat, newest first.
    pub async fn list_by_thermostat(
        pool: &PgPool,
        thermostat_id: DbId,
    ) -> Result<Vec<ThermostatSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {SETTING_COLUMNS} FROM thermostat_settings \
             WHERE thermostat_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ThermostatSetting>(&query)
            .bind(thermostat_id)
            .fetch_all(pool)
            .await
    }

    /// The setting in effect at `at`: newest entry created at or before it.
    pub async fn find_at(
        pool: &PgPool,
        thermostat_id: DbId,
        at: Timestamp,
    ) -> Result<Option<ThermostatSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {SETTING_COLUMNS} FROM thermostat_settings \
             WHERE thermostat_id = $1 AND created_at <= $2 \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, ThermostatSetting>(&query)
            .bind(thermostat_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
