//! Stateless repositories: each is a unit struct of async fns taking a pool.

pub mod floorplan_repo;
pub mod thermostat_repo;
pub mod vote_repo;

pub use floorplan_repo::FloorplanRepo;
pub use thermostat_repo::{ThermostatRepo, ThermostatSettingRepo};
pub use vote_repo::VoteRepo;
