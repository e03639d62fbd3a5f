//! Handlers for the `/floorplans` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use heatvote_core::error::CoreError;
use heatvote_core::floorplan::{validate_name, validate_radius};
use heatvote_core::types::DbId;
use heatvote_db::models::floorplan::{CreateFloorplan, Floorplan, UpdateFloorplan};

use crate::error::{AppError, AppResult};
use crate::handlers::require_floorplan;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/floorplans
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFloorplan>,
) -> AppResult<(StatusCode, Json<DataResponse<Floorplan>>)> {
    validate_name(&input.name)?;
    if let Some(radius) = input.radius {
        validate_radius(radius)?;
    }
    let floorplan = state.store.create_floorplan(&input).await?;
    tracing::info!(floorplan_id = floorplan.id, name = %floorplan.name, "Floorplan created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: floorplan })))
}

/// GET /api/v1/floorplans
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Floorplan>>>> {
    let floorplans = state.store.list_floorplans().await?;
    Ok(Json(DataResponse { data: floorplans }))
}

/// GET /api/v1/floorplans/current
///
/// The deployment's active floor-plan: the one with the lowest id. 404 when
/// none has been created yet.
pub async fn current(State(state): State<AppState>) -> AppResult<Json<DataResponse<Floorplan>>> {
    let floorplan = state
        .store
        .current_floorplan()
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;
    Ok(Json(DataResponse { data: floorplan }))
}

/// GET /api/v1/floorplans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Floorplan>>> {
    let floorplan = require_floorplan(&state, id).await?;
    Ok(Json(DataResponse { data: floorplan }))
}

/// PUT /api/v1/floorplans/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFloorplan>,
) -> AppResult<Json<DataResponse<Floorplan>>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name)?;
    }
    if let Some(radius) = input.radius {
        validate_radius(radius)?;
    }
    let floorplan = state
        .store
        .update_floorplan(id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Floorplan",
            id,
        }))?;
    Ok(Json(DataResponse { data: floorplan }))
}

/// DELETE /api/v1/floorplans/{id}
///
/// Removes the floor-plan with all of its votes, thermostats and settings.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.store.delete_floorplan(id).await? {
        tracing::info!(floorplan_id = id, "Floorplan deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Floorplan",
            id,
        }))
    }
}
