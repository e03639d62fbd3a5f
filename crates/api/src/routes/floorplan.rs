//! Route definitions for the `/floorplans` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{clusters, floorplan, thermostat, vote};
use crate::state::AppState;
use crate::ws;

/// Routes mounted at `/floorplans`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /current              -> current
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/votes           -> vote::list (?hours=)
/// POST   /{id}/votes           -> vote::submit
/// GET    /{id}/clusters        -> clusters::query (?offset_minutes=&half_life_minutes=&cutoff_minutes=&radius=)
/// GET    /{id}/thermostats     -> thermostat::list_for_floorplan (?offset_minutes=)
/// POST   /{id}/thermostats     -> thermostat::create
/// GET    /{id}/ws              -> ws::ws_handler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(floorplan::list).post(floorplan::create))
        .route("/current", get(floorplan::current))
        .route(
            "/{id}",
            get(floorplan::get_by_id)
                .put(floorplan::update)
                .delete(floorplan::delete),
        )
        .route("/{id}/votes", get(vote::list).post(vote::submit))
        .route("/{id}/clusters", get(clusters::query))
        .route(
            "/{id}/thermostats",
            get(thermostat::list_for_floorplan).post(thermostat::create),
        )
        .route("/{id}/ws", get(ws::ws_handler))
}
