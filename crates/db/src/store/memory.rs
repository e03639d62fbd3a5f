//! In-process [`RecordStore`] used by tests and local experiments.
//!
//! Mirrors the PostgreSQL behaviour that matters to the engine: ids are
//! assigned in insertion order, foreign keys are checked, and deleting a
//! parent cascades to its children.

use async_trait::async_trait;
use chrono::Utc;
use heatvote_core::floorplan::DEFAULT_RADIUS;
use heatvote_core::thermostat::resolve_at;
use heatvote_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use super::{RecordStore, StoreResult};
use crate::models::floorplan::{CreateFloorplan, Floorplan, UpdateFloorplan};
use crate::models::thermostat::{
    CreateThermostat, NewThermostatSetting, Thermostat, ThermostatSetting, UpdateThermostat,
};
use crate::models::vote::{NewVote, Vote};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    floorplans: Vec<Floorplan>,
    votes: Vec<Vote>,
    thermostats: Vec<Thermostat>,
    settings: Vec<ThermostatSetting>,
}

impl Tables {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn has_floorplan(&self, id: DbId) -> bool {
        self.floorplans.iter().any(|f| f.id == id)
    }
}

/// [`RecordStore`] held entirely in memory behind a single `RwLock`.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    // -- floor-plans ----------------------------------------------------------

    async fn create_floorplan(&self, input: &CreateFloorplan) -> StoreResult<Floorplan> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let floorplan = Floorplan {
            id: tables.allocate_id(),
            name: input.name.clone(),
            image_url: input.image_url.clone(),
            radius: input.radius.unwrap_or(DEFAULT_RADIUS),
            created_at: now,
            updated_at: now,
        };
        tables.floorplans.push(floorplan.clone());
        Ok(floorplan)
    }

    async fn find_floorplan(&self, id: DbId) -> StoreResult<Option<Floorplan>> {
        let tables = self.tables.read().await;
        Ok(tables.floorplans.iter().find(|f| f.id == id).cloned())
    }

    async fn current_floorplan(&self) -> StoreResult<Option<Floorplan>> {
        let tables = self.tables.read().await;
        Ok(tables.floorplans.iter().min_by_key(|f| f.id).cloned())
    }

    async fn list_floorplans(&self) -> StoreResult<Vec<Floorplan>> {
        Ok(self.tables.read().await.floorplans.clone())
    }

    async fn update_floorplan(
        &self,
        id: DbId,
        input: &UpdateFloorplan,
    ) -> StoreResult<Option<Floorplan>> {
        let mut tables = self.tables.write().await;
        let Some(floorplan) = tables.floorplans.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            floorplan.name = name.clone();
        }
        if let Some(image_url) = &input.image_url {
            floorplan.image_url = Some(image_url.clone());
        }
        if let Some(radius) = input.radius {
            floorplan.radius = radius;
        }
        floorplan.updated_at = Utc::now();
        Ok(Some(floorplan.clone()))
    }

    async fn delete_floorplan(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.floorplans.len();
        tables.floorplans.retain(|f| f.id != id);
        if tables.floorplans.len() == before {
            return Ok(false);
        }
        tables.votes.retain(|v| v.floorplan_id != id);
        let removed: Vec<DbId> = tables
            .thermostats
            .iter()
            .filter(|t| t.floorplan_id == id)
            .map(|t| t.id)
            .collect();
        tables.thermostats.retain(|t| t.floorplan_id != id);
        tables
            .settings
            .retain(|s| !removed.contains(&s.thermostat_id));
        Ok(true)
    }

    // -- votes ----------------------------------------------------------------

    async fn insert_vote(&self, vote: &NewVote) -> StoreResult<Vote> {
        let mut tables = self.tables.write().await;
        if !tables.has_floorplan(vote.floorplan_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let stored = Vote {
            id: tables.allocate_id(),
            floorplan_id: vote.floorplan_id,
            visitor_id: vote.visitor_id.clone(),
            ip_address: vote.ip_address.clone(),
            x: vote.x,
            y: vote.y,
            value: vote.value,
            created_at: vote.created_at,
        };
        tables.votes.push(stored.clone());
        Ok(stored)
    }

    async fn list_votes(
        &self,
        floorplan_id: DbId,
        since: Option<Timestamp>,
    ) -> StoreResult<Vec<Vote>> {
        let tables = self.tables.read().await;
        let mut votes: Vec<Vote> = tables
            .votes
            .iter()
            .filter(|v| v.floorplan_id == floorplan_id)
            .filter(|v| since.map_or(true, |s| v.created_at >= s))
            .cloned()
            .collect();
        votes.sort_by_key(|v| (v.created_at, v.id));
        Ok(votes)
    }

    async fn latest_vote_by_visitor(
        &self,
        floorplan_id: DbId,
        visitor_id: &str,
    ) -> StoreResult<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.floorplan_id == floorplan_id && v.visitor_id == visitor_id)
            .max_by_key(|v| (v.created_at, v.id))
            .cloned())
    }

    // -- thermostats ----------------------------------------------------------

    async fn create_thermostat(
        &self,
        floorplan_id: DbId,
        input: &CreateThermostat,
    ) -> StoreResult<Thermostat> {
        let mut tables = self.tables.write().await;
        if !tables.has_floorplan(floorplan_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let now = Utc::now();
        let thermostat = Thermostat {
            id: tables.allocate_id(),
            floorplan_id,
            name: input.name.clone(),
            x: input.x,
            y: input.y,
            created_at: now,
            updated_at: now,
        };
        tables.thermostats.push(thermostat.clone());
        Ok(thermostat)
    }

    async fn find_thermostat(&self, id: DbId) -> StoreResult<Option<Thermostat>> {
        let tables = self.tables.read().await;
        Ok(tables.thermostats.iter().find(|t| t.id == id).cloned())
    }

    async fn list_thermostats(&self, floorplan_id: DbId) -> StoreResult<Vec<Thermostat>> {
        let tables = self.tables.read().await;
        Ok(tables
            .thermostats
            .iter()
            .filter(|t| t.floorplan_id == floorplan_id)
            .cloned()
            .collect())
    }

    async fn update_thermostat(
        &self,
        id: DbId,
        input: &UpdateThermostat,
    ) -> StoreResult<Option<Thermostat>> {
        let mut tables = self.tables.write().await;
        let Some(thermostat) = tables.thermostats.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            thermostat.name = name.clone();
        }
        if let Some(x) = input.x {
            thermostat.x = x;
        }
        if let Some(y) = input.y {
            thermostat.y = y;
        }
        thermostat.updated_at = Utc::now();
        Ok(Some(thermostat.clone()))
    }

    async fn delete_thermostat(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.thermostats.len();
        tables.thermostats.retain(|t| t.id != id);
        if tables.thermostats.len() == before {
            return Ok(false);
        }
        tables.settings.retain(|s| s.thermostat_id != id);
        Ok(true)
    }

    // -- thermostat settings --------------------------------------------------

    async fn insert_setting(
        &self,
        setting: &NewThermostatSetting,
    ) -> StoreResult<ThermostatSetting> {
        let mut tables = self.tables.write().await;
        if !tables.thermostats.iter().any(|t| t.id == setting.thermostat_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let stored = ThermostatSetting {
            id: tables.allocate_id(),
            thermostat_id: setting.thermostat_id,
            temperature: setting.temperature,
            author: setting.author.clone(),
            created_at: setting.created_at,
        };
        tables.settings.push(stored.clone());
        Ok(stored)
    }

    async fn list_settings(&self, thermostat_id: DbId) -> StoreResult<Vec<ThermostatSetting>> {
        let tables = self.tables.read().await;
        let mut settings: Vec<ThermostatSetting> = tables
            .settings
            .iter()
            .filter(|s| s.thermostat_id == thermostat_id)
            .cloned()
            .collect();
        settings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(settings)
    }

    async fn setting_at(
        &self,
        thermostat_id: DbId,
        at: Timestamp,
    ) -> StoreResult<Option<ThermostatSetting>> {
        let tables = self.tables.read().await;
        let log: Vec<ThermostatSetting> = tables
            .settings
            .iter()
            .filter(|s| s.thermostat_id == thermostat_id)
            .cloned()
            .collect();
        Ok(resolve_at(&log, at).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
