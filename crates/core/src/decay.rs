//! Exponential half-life decay of vote influence.
//!
//! A vote's weight halves every `half_life` minutes:
//! `weight = 0.5 ^ (age / half_life)`.

use crate::error::CoreError;
use crate::types::{minutes_between, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default half-life in minutes.
pub const DEFAULT_HALF_LIFE_MINUTES: f64 = 30.0;

/// Default cutoff age in minutes; older votes are ignored entirely.
pub const DEFAULT_CUTOFF_MINUTES: f64 = 120.0;

/// Largest accepted cutoff in minutes (7 days).
pub const MAX_CUTOFF_MINUTES: f64 = 7.0 * 24.0 * 60.0;

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

/// Decay weight for a vote of the given age (minutes).
///
/// Returns `1.0` at age zero and approaches zero as age grows. Callers must
/// supply `half_life_minutes > 0` (see [`validate_half_life`]) and must
/// exclude negative ages themselves: a vote created after the reference
/// time has not happened yet and is not merely "undecayed".
pub fn weight_for_age(age_minutes: f64, half_life_minutes: f64) -> f64 {
    0.5_f64.powf(age_minutes / half_life_minutes)
}

/// Decay weight of an event created at `event_time`, seen from `reference_time`.
pub fn weight(event_time: Timestamp, reference_time: Timestamp, half_life_minutes: f64) -> f64 {
    weight_for_age(minutes_between(event_time, reference_time), half_life_minutes)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a half-life is a finite positive number of minutes.
pub fn validate_half_life(half_life_minutes: f64) -> Result<(), CoreError> {
    if !half_life_minutes.is_finite() || half_life_minutes <= 0.0 {
        return Err(CoreError::Validation(format!(
            "half_life_minutes must be > 0, got {half_life_minutes}"
        )));
    }
    Ok(())
}

/// Validate that a cutoff lies in `0..=MAX_CUTOFF_MINUTES`.
pub fn validate_cutoff(cutoff_minutes: f64) -> Result<(), CoreError> {
    if !(0.0..=MAX_CUTOFF_MINUTES).contains(&cutoff_minutes) {
        return Err(CoreError::Validation(format!(
            "cutoff_minutes must be between 0 and {MAX_CUTOFF_MINUTES}, got {cutoff_minutes}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
