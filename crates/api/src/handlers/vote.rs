//! Handlers for `/floorplans/{id}/votes`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use heatvote_core::types::DbId;
use heatvote_db::models::vote::PublicVote;
use serde::Deserialize;

use crate::config::MAX_RECENT_VOTE_HOURS;
use crate::engine::VoteSubmission;
use crate::error::{AppError, AppResult};
use crate::handlers::require_floorplan;
use crate::middleware::visitor::Visitor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for a vote submission.
#[derive(Debug, Deserialize)]
pub struct SubmitVote {
    pub x: i32,
    pub y: i32,
    /// Sentiment code: -1 cold, 0 comfortable, 1 hot.
    pub value: i16,
}

/// Query parameters for the vote listing.
#[derive(Debug, Deserialize)]
pub struct ListVotesQuery {
    /// How many hours back to include (defaults to the configured window).
    pub hours: Option<i64>,
}

/// POST /api/v1/floorplans/{id}/votes
///
/// Returns 201 with the public vote, 429 inside the cooldown, 400 on bad
/// input. Issues the visitor cookie when the request carried none.
pub async fn submit(
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
    visitor: Visitor,
    Json(input): Json<SubmitVote>,
) -> AppResult<impl IntoResponse> {
    let cookie = visitor.cookie();
    let vote = state
        .ingest
        .submit_vote(
            state.store.as_ref(),
            &state.hub,
            VoteSubmission {
                floorplan_id,
                visitor_id: visitor.id,
                ip_address: visitor.ip_address,
                x: input.x,
                y: input.y,
                value: input.value,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        cookie,
        Json(DataResponse {
            data: vote.public(),
        }),
    ))
}

/// GET /api/v1/floorplans/{id}/votes
///
/// Recent votes in creation order, public fields only.
pub async fn list(
    State(state): State<AppState>,
    Path(floorplan_id): Path<DbId>,
    Query(params): Query<ListVotesQuery>,
) -> AppResult<Json<DataResponse<Vec<PublicVote>>>> {
    let hours = params.hours.unwrap_or(state.config.recent_vote_hours);
    if !(1..=MAX_RECENT_VOTE_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_RECENT_VOTE_HOURS}"
        )));
    }
    require_floorplan(&state, floorplan_id).await?;

    let since = Utc::now() - Duration::hours(hours);
    let votes = state.store.list_votes(floorplan_id, Some(since)).await?;
    Ok(Json(DataResponse {
        data: votes.iter().map(|v| v.public()).collect(),
    }))
}
