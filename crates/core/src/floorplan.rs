//! Floor-plan display radius bounds and validation.

use crate::error::CoreError;

/// Smallest allowed display radius in pixels.
pub const MIN_RADIUS: i32 = 10;

/// Largest allowed display radius in pixels.
pub const MAX_RADIUS: i32 = 200;

/// Display radius given to a new floor-plan when none is supplied.
pub const DEFAULT_RADIUS: i32 = 50;

/// Fraction of the display radius within which votes are grouped.
pub const GROUPING_FACTOR: f64 = 0.8;

/// Validate a floor-plan display radius (`10..=200`).
pub fn validate_radius(radius: i32) -> Result<(), CoreError> {
    if !(MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
        return Err(CoreError::Validation(format!(
            "radius must be between {MIN_RADIUS} and {MAX_RADIUS}, got {radius}"
        )));
    }
    Ok(())
}

/// Validate a floor-plan name.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    Ok(())
}
