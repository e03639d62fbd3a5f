//! PostgreSQL-backed [`RecordStore`], delegating to the repositories.

use async_trait::async_trait;
use heatvote_core::types::{DbId, Timestamp};

use super::{RecordStore, StoreResult};
use crate::models::floorplan::{CreateFloorplan, Floorplan, UpdateFloorplan};
use crate::models::thermostat::{
    CreateThermostat, NewThermostatSetting, Thermostat, ThermostatSetting, UpdateThermostat,
};
use crate::models::vote::{NewVote, Vote};
use crate::repositories::{FloorplanRepo, ThermostatRepo, ThermostatSettingRepo, VoteRepo};
use crate::DbPool;

/// [`RecordStore`] over a sqlx PostgreSQL pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await
    }

    async fn create_floorplan(&self, input: &CreateFloorplan) -> StoreResult<Floorplan> {
        FloorplanRepo::create(&self.pool, input).await
    }

    async fn find_floorplan(&self, id: DbId) -> StoreResult<Option<Floorplan>> {
        FloorplanRepo::find_by_id(&self.pool, id).await
    }

    async fn current_floorplan(&self) -> StoreResult<Option<Floorplan>> {
        FloorplanRepo::find_first(&self.pool).await
    }

    async fn list_floorplans(&self) -> StoreResult<Vec<Floorplan>> {
        FloorplanRepo::list(&self.pool).await
    }

    async fn update_floorplan(
        &self,
        id: DbId,
        input: &UpdateFloorplan,
    ) -> StoreResult<Option<Floorplan>> {
        FloorplanRepo::update(&self.pool, id, input).await
    }

    async fn delete_floorplan(&self, id: DbId) -> StoreResult<bool> {
        FloorplanRepo::delete(&self.pool, id).await
    }

    async fn insert_vote(&self, vote: &NewVote) -> StoreResult<Vote> {
        VoteRepo::insert(&self.pool, vote).await
    }

    async fn list_votes(
        &self,
        floorplan_id: DbId,
        since: Option<Timestamp>,
    ) -> StoreResult<Vec<Vote>> {
        VoteRepo::list_by_floorplan(&self.pool, floorplan_id, since).await
    }

    async fn latest_vote_by_visitor(
        &self,
        floorplan_id: DbId,
        visitor_id: &str,
    ) -> StoreResult<Option<Vote>> {
        VoteRepo::latest_by_visitor(&self.pool, floorplan_id, visitor_id).await
    }

    async fn create_thermostat(
        &self,
        floorplan_id: DbId,
        input: &CreateThermostat,
    ) -> StoreResult<Thermostat> {
        ThermostatRepo::create(&self.pool, floorplan_id, input).await
    }

    async fn find_thermostat(&self, id: DbId) -> StoreResult<Option<Thermostat>> {
        ThermostatRepo::find_by_id(&self.pool, id).await
    }

    async fn list_thermostats(&self, floorplan_id: DbId) -> StoreResult<Vec<Thermostat>> {
        ThermostatRepo::list_by_floorplan(&self.pool, floorplan_id).await
    }

    async fn update_thermostat(
        &self,
        id: DbId,
        input: &UpdateThermostat,
    ) -> StoreResult<Option<Thermostat>> {
        ThermostatRepo::update(&self.pool, id, input).await
    }

    async fn delete_thermostat(&self, id: DbId) -> StoreResult<bool> {
        ThermostatRepo::delete(&self.pool, id).await
    }

    async fn insert_setting(
        &self,
        setting: &NewThermostatSetting,
    ) -> StoreResult<ThermostatSetting> {
        ThermostatSettingRepo::insert(&self.pool, setting).await
    }

    async fn list_settings(&self, thermostat_id: DbId) -> StoreResult<Vec<ThermostatSetting>> {
        ThermostatSettingRepo::list_by_thermostat(&self.pool, thermostat_id).await
    }

    async fn setting_at(
        &self,
        thermostat_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<ThermostatSetting>> {
        ThermostatSettingRepo::find_at(&self.pool, thermostat_id, at).await
    }
}
