//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers validate input with `heatvote_core`, call the [`RecordStore`]
//! held in state, and map errors via [`AppError`].
//!
//! [`RecordStore`]: heatvote_db::RecordStore
//! [`AppError`]: crate::error::AppError

pub mod clusters;
pub mod floorplan;
pub mod thermostat;
pub mod vote;

use heatvote_core::error::CoreError;
use heatvote_core::types::DbId;
use heatvote_db::models::floorplan::Floorplan;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a floor-plan or fail with 404.
pub(crate) async fn require_floorplan(state: &AppState, id: DbId) -> AppResult<Floorplan> {
    state
        .store
        .find_floorplan(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Floorplan",
            id,
        }))
}
