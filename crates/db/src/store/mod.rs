//! The record-store seam.
//!
//! The engine never talks to a database directly; it goes through
//! [`RecordStore`]. Errors are `sqlx::Error` and are passed through to the
//! caller unmodified. No store operation is retried here.

mod memory;
mod postgres;

use async_trait::async_trait;
use heatvote_core::types::{DbId, Timestamp};

use crate::models::floorplan::{CreateFloorplan, Floorplan, UpdateFloorplan};
use crate::models::thermostat::{
    CreateThermostat, NewThermostatSetting, Thermostat, ThermostatSetting, UpdateThermostat,
};
use crate::models::vote::{NewVote, Vote};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Durable record store for floor-plans, votes, thermostats, and settings.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    // -- floor-plans ----------------------------------------------------------

    async fn create_floorplan(&self, input: &CreateFloorplan) -> StoreResult<Floorplan>;

    async fn find_floorplan(&self, id: DbId) -> StoreResult<Option<Floorplan>>;

    /// The floor-plan with the lowest id (single-deployment convention).
    async fn current_floorplan(&self) -> StoreResult<Option<Floorplan>>;

    async fn list_floorplans(&self) -> StoreResult<Vec<Floorplan>>;

    async fn update_floorplan(
        &self,
        id: DbId,
        input: &UpdateFloorplan,
    ) -> StoreResult<Option<Floorplan>>;

    /// Delete a floor-plan together with its votes, thermostats and settings.
    async fn delete_floorplan(&self, id: DbId) -> StoreResult<bool>;

    // -- votes ----------------------------------------------------------------

    async fn insert_vote(&self, vote: &NewVote) -> StoreResult<Vote>;

    /// Votes in creation order, optionally only those created at or after `since`.
    async fn list_votes(&self, floorplan_id: DbId, since: Option<Timestamp>)
        -> StoreResult<Vec<Vote>>;

    async fn latest_vote_by_visitor(
        &self,
        floorplan_id: DbId,
        visitor_id: &str,
    ) -> StoreResult<Option<Vote>>;

    // -- thermostats ----------------------------------------------------------

    async fn create_thermostat(
        &self,
        floorplan_id: DbId,
        input: &CreateThermostat,
    ) -> StoreResult<Thermostat>;

    async fn find_thermostat(&self, id: DbId) -> StoreResult<Option<Thermostat>>;

    async fn list_thermostats(&self, floorplan_id: DbId) -> StoreResult<Vec<Thermostat>>;

    async fn update_thermostat(
        &self,
        id: DbId,
        input: &UpdateThermostat,
    ) -> StoreResult<Option<Thermostat>>;

    async fn delete_thermostat(&self, id: DbId) -> StoreResult<bool>;

    // -- thermostat settings --------------------------------------------------

    async fn insert_setting(&self, setting: &NewThermostatSetting)
        -> StoreResult<ThermostatSetting>;

    /// Full settings log, newest first.
    async fn list_settings(&self, thermostat_id: DbId) -> StoreResult<Vec<ThermostatSetting>>;

    /// Newest setting created at or before `at`.
    async fn setting_at(
        &self,
        thermostat_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<ThermostatSetting>>;
}
