//! Handlers for thermostats and their append-only settings log.
//!
//! Thermostats are created under a floor-plan
//! (`/floorplans/{id}/thermostats`) and addressed directly afterwards
//! (`/thermostats/{id}`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use heatvote_core::error::CoreError;
use heatvote_core::thermostat::{
    validate_author, validate_device, validate_name, validate_setting_value,
};
use heatvote_core::time_travel;
use heatvote_core::types::{DbId, Timestamp};
use heatvote_core::vote::validate_coordinates;
use heatvote_db::models::thermostat::{
    CreateThermostat, CreateThermostatSetting, NewThermostatSetting, Thermostat,
    ThermostatSetting, UpdateThermostat,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::require_floorplan;
use crate::response::DataResponse;
use crate::state::AppState;

/// A thermostat together with the setting in effect at the requested time.
#[derive(Debug, Serialize)]
pub struct ThermostatView {
    #[serde(flatten)]
    pub thermostat: Thermostat,
    /// `None` when no setting had been recorded yet at `as_of`.
    pub setting: Option<ThermostatSetting>,
    pub as_of: Timestamp,
    /// Set when `as_of` is not the present.
    pub historical: bool,
}

/// Query parameters for the per-floor-plan thermostat listing.
#[derive(Debug, Deserialize)]
pub struct ListThermostatsQuery {
    pub offset_minutes: Option<i64>,
}

/// Query parameters for point-in-time resolution. Supply one of the two;
/// with neither, the current setting is returned.
#[derive(Debug, Deserialize)]
pub struct SettingAtQuery {
    pub at: Option<DateTime<Utc>>,
    pub offset_minutes: Option<i64>,
}

async fn require_thermostat(state: &AppState, id: DbId) -> AppResult<Thermostat> {
    state
        .store
        .find_thermostat(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Thermostat",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// POST /api/v1/floorplans/{id}/thermostats
pub async fn create(
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
    Json(input): Json<CreateThermostat>,
) -> AppResult<(StatusCode, Json<DataResponse<Thermostat>>)> {
    validate_device(&input.name, input.x, input.y)?;
    require_floorplan(&state, floorplan_id).await?;
    let thermostat = state.store.create_thermostat(floorplan_id, &input).await?;
    tracing::info!(
        thermostat_id = thermostat.id,
        floorplan_id,
        "Thermostat created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: thermostat })))
}

/// GET /api/v1/floorplans/{id}/thermostats
///
/// Each device with its setting at `now + offset_minutes`.
pub async fn list_for_floorplan(
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
    Query(params): Query<ListThermostatsQuery>,
) -> AppResult<Json<DataResponse<Vec<ThermostatView>>>> {
    require_floorplan(&state, floorplan_id).await?;

    let offset = params.offset_minutes.unwrap_or(0);
    time_travel::validate_offset(offset)?;
    let as_of = time_travel::reference_time(Utc::now(), offset);
    let historical = params.offset_minutes.is_some_and(|o| o != 0);

    let thermostats = state.store.list_thermostats(floorplan_id).await?;
    let mut views = Vec::with_capacity(thermostats.len());
    for thermostat in thermostats {
        let setting = state.store.setting_at(thermostat.id, as_of).await?;
        views.push(ThermostatView {
            thermostat,
            setting,
            as_of,
            historical,
        });
    }
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/thermostats/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Thermostat>>> {
    let thermostat = require_thermostat(&state, id).await?;
    Ok(Json(DataResponse { data: thermostat }))
}

/// PUT /api/v1/thermostats/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateThermostat>,
) -> AppResult<Json<DataResponse<Thermostat>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name)?;
    }
    validate_coordinates(input.x.unwrap_or(0), input.y.unwrap_or(0))?;

    let thermostat = state
        .store
        .update_thermostat(id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Thermostat",
            id,
        }))?;
    Ok(Json(DataResponse { data: thermostat }))
}

/// DELETE /api/v1/thermostats/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.store.delete_thermostat(id).await? {
        tracing::info!(thermostat_id = id, "Thermostat deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Thermostat",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Settings log
// ---------------------------------------------------------------------------

/// POST /api/v1/thermostats/{id}/settings
pub async fn append_setting(
    State(state): State<AppState>,
    Path(thermostat_id): Path<DbId>,
    Json(input): Json<CreateThermostatSetting>,
) -> AppResult<(StatusCode, Json<DataResponse<ThermostatSetting>>)> {
    validate_setting_value(input.temperature)?;
    validate_author(&input.author)?;
    require_thermostat(&state, thermostat_id).await?;

    let setting = state
        .store
        .insert_setting(&NewThermostatSetting {
            thermostat_id,
            temperature: input.temperature,
            author: input.author.trim().to_string(),
            created_at: Utc::now(),
        })
        .await?;
    tracing::info!(
        thermostat_id,
        temperature = setting.temperature,
        author = %setting.author,
        "Thermostat setting recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: setting })))
}

/// GET /api/v1/thermostats/{id}/settings
///
/// Full history, newest first.
pub async fn list_settings(
    State(state): State<AppState>,
    Path(thermostat_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ThermostatSetting>>>> {
    require_thermostat(&state, thermostat_id).await?;
    let settings = state.store.list_settings(thermostat_id).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/thermostats/{id}/settings/at
///
/// The setting in effect at `at` (or `now + offset_minutes`); `data` is
/// `null` when nothing had been set yet.
pub async fn setting_at(
    State(state): State<AppState>,
    Path(thermostat_id): Path<DbId>,
    Query(params): Query<SettingAtQuery>,
) -> AppResult<Json<DataResponse<Option<ThermostatSetting>>>> {
    let at = match (params.at, params.offset_minutes) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "Supply either 'at' or 'offset_minutes', not both".into(),
            ))
        }
        (Some(at), None) => at,
        (None, Some(offset)) => {
            time_travel::validate_offset(offset)?;
            time_travel::reference_time(Utc::now(), offset)
        }
        (None, None) => Utc::now(),
    };

    require_thermostat(&state, thermostat_id).await?;
    let setting = state.store.setting_at(thermostat_id, at).await?;
    Ok(Json(DataResponse { data: setting }))
}
