//! Route definitions for the `/thermostats` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::thermostat;
use crate::state::AppState;

/// Routes mounted at `/thermostats`.
///
/// ```text
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/settings        -> list_settings
/// POST   /{id}/settings        -> append_setting
/// GET    /{id}/settings/at     -> setting_at (?at= | ?offset_minutes=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(thermostat::get_by_id)
                .put(thermostat::update)
                .delete(thermostat::delete),
        )
        .route(
            "/{id}/settings",
            get(thermostat::list_settings).post(thermostat::append_setting),
        )
        .route("/{id}/settings/at", get(thermostat::setting_at))
}
