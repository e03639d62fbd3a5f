//! Thermostat (point device) models and DTOs.

use heatvote_core::thermostat::Timestamped;
use heatvote_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `thermostats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Thermostat {
    pub id: DbId,
    pub floorplan_id: DbId,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `thermostat_settings` log.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ThermostatSetting {
    pub id: DbId,
    pub thermostat_id: DbId,
    pub temperature: f64,
    pub author: String,
    pub created_at: Timestamp,
}

impl Timestamped for ThermostatSetting {
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a thermostat on a floor-plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThermostat {
    pub name: String,
    pub x: i32,
    pub y: i32,
}

/// DTO for updating a thermostat. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateThermostat {
    pub name: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
}

/// DTO for appending a setting to a thermostat's log.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThermostatSetting {
    pub temperature: f64,
    pub author: String,
}

/// A validated setting ready to be appended.
#[derive(Debug, Clone)]
pub struct NewThermostatSetting {
    pub thermostat_id: DbId,
    pub temperature: f64,
    pub author: String,
    pub created_at: Timestamp,
}
