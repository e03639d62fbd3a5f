//! Handler for time-travel cluster queries.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use heatvote_core::clustering::ClusterParams;
use heatvote_core::time_travel::{self, TimeTravelView};
use heatvote_core::types::DbId;
use heatvote_core::vote::VoteSample;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::require_floorplan;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /floorplans/{id}/clusters`.
///
/// Everything is optional: the offset defaults to now, decay parameters to
/// the configured defaults, and the radius to the floor-plan's own.
#[derive(Debug, Default, Deserialize)]
pub struct ClusterQuery {
    pub offset_minutes: Option<i64>,
    pub half_life_minutes: Option<f64>,
    pub cutoff_minutes: Option<f64>,
    pub radius: Option<f64>,
}

/// GET /api/v1/floorplans/{id}/clusters
///
/// Fresh full clustering pass at `now + offset_minutes`.
pub async fn query(
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
    Query(params): Query<ClusterQuery>,
) -> AppResult<Json<DataResponse<TimeTravelView>>> {
    let floorplan = require_floorplan(&state, floorplan_id).await?;

    let offset_minutes = params.offset_minutes.unwrap_or(0);
    time_travel::validate_offset(offset_minutes)?;

    let cluster_params = ClusterParams::new(
        params
            .half_life_minutes
            .unwrap_or(state.config.half_life_minutes),
        params.cutoff_minutes.unwrap_or(state.config.cutoff_minutes),
        params.radius.unwrap_or(f64::from(floorplan.radius)),
    )?;

    let now = Utc::now();
    let reference = time_travel::reference_time(now, offset_minutes);
    let since = time_travel::visibility_start(reference, &cluster_params);

    let votes = state.store.list_votes(floorplan_id, Some(since)).await?;
    let samples: Vec<VoteSample> = votes.iter().filter_map(|v| v.sample()).collect();
    if samples.len() != votes.len() {
        tracing::warn!(
            floorplan_id,
            skipped = votes.len() - samples.len(),
            "Skipped votes with unknown sentiment codes"
        );
    }

    let view = time_travel::query_clusters(&samples, now, offset_minutes, &cluster_params)?;
    tracing::debug!(
        floorplan_id,
        offset_minutes,
        votes = samples.len(),
        clusters = view.clusters.len(),
        "Clusters computed"
    );
    Ok(Json(DataResponse { data: view }))
}
