pub mod floorplan;
pub mod health;
pub mod thermostat;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /floorplans                                  list, create
/// /floorplans/current                          lowest-id floor-plan
/// /floorplans/{id}                             get, update, delete
/// /floorplans/{id}/votes                       list recent, submit
/// /floorplans/{id}/clusters                    time-travel cluster query
/// /floorplans/{id}/thermostats                 list (with settings), create
/// /floorplans/{id}/ws                          live vote WebSocket
///
/// /thermostats/{id}                            get, update, delete
/// /thermostats/{id}/settings                   history, append
/// /thermostats/{id}/settings/at                point-in-time setting
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Floor-plans and everything scoped to one.
        .nest("/floorplans", floorplan::router())
        // Thermostat devices and their settings log.
        .nest("/thermostats", thermostat::router())
}
