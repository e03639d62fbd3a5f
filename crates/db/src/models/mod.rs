pub mod floorplan;
pub mod thermostat;
pub mod vote;
