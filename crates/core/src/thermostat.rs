//! Point-device (thermostat) validation and historical setting resolution.
//!
//! A thermostat owns an append-only log of settings. The value "as of" a
//! time is the newest entry created at or before that time. Entries created later never leak backward.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Settings must be strictly above this (degrees Fahrenheit).
pub const MIN_SETTING_EXCLUSIVE: f64 = 32.0;

/// Settings must be strictly below this (degrees Fahrenheit).
pub const MAX_SETTING_EXCLUSIVE: f64 = 100.0;

/// Validate a thermostat setting value.
pub fn validate_setting_value(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value <= MIN_SETTING_EXCLUSIVE || value >= MAX_SETTING_EXCLUSIVE {
        return Err(CoreError::Validation(format!(
            "temperature must be greater than {MIN_SETTING_EXCLUSIVE} and less than \
             {MAX_SETTING_EXCLUSIVE}, got {value}"
        )));
    }
    Ok(())
}

/// Validate a thermostat label.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    Ok(())
}

/// Validate a thermostat's label and fixed position.
pub fn validate_device(name: &str, x: i32, y: i32) -> Result<(), CoreError> {
    validate_name(name)?;
    crate::vote::validate_coordinates(x, y)
}

/// Validate the author recorded against a setting.
pub fn validate_author(author: &str) -> Result<(), CoreError> {
    if author.trim().is_empty() {
        return Err(CoreError::Validation("author must not be empty".into()));
    }
    Ok(())
}

/// Anything carrying a creation timestamp that can be resolved "as of" a time.
pub trait Timestamped {
    fn created_at(&self) -> Timestamp;
}

/// Return the newest record created at or before `at`, or `None` when the
/// log had no entry yet at that time.
///
/// The input does not need to be sorted. When two records share the same
/// timestamp the later one in the slice wins, matching append order.
pub fn resolve_at<T: Timestamped>(records: &[T], at: Timestamp) -> Option<&T> {
    records
        .iter()
        .filter(|r| r.created_at() <= at)
        .fold(None, |best: Option<&T>, r| match best {
            Some(b) if b.created_at() > r.created_at() => Some(b),
            _ => Some(r),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[derive(Debug, PartialEq)]
    struct Entry {
        value: f64,
        at: Timestamp,
    }

    impl Timestamped for Entry {
        fn created_at(&self) -> Timestamp {
            self.at
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 8, 24, 9, 0, 0).unwrap()
    }

    fn log() -> Vec<Entry> {
        vec![
            Entry {
                value: 68.0,
                at: t0(),
            },
            Entry {
                value: 72.0,
                at: t0() + Duration::hours(1),
            },
        ]
    }

    #[test]
    fn resolves_setting_in_effect_between_entries() {
        let log = log();
        let found = resolve_at(&log, t0() + Duration::minutes(30)).unwrap();
        assert_eq!(found.value, 68.0);
    }

    #[test]
    fn unset_before_first_entry() {
        let log = log();
        assert!(resolve_at(&log, t0() - Duration::minutes(1)).is_none());
    }

    #[test]
    fn entry_at_exact_time_is_in_effect() {
        let log = log();
        assert_eq!(resolve_at(&log, t0() + Duration::hours(1)).unwrap().value, 72.0);
    }

    #[test]
    fn unsorted_input_still_resolves_latest_before() {
        let mut log = log();
        log.reverse();
        assert_eq!(resolve_at(&log, t0() + Duration::hours(2)).unwrap().value, 72.0);
        assert_eq!(resolve_at(&log, t0() + Duration::minutes(59)).unwrap().value, 68.0);
    }

    #[test]
    fn same_timestamp_later_append_wins() {
        let log = vec![
            Entry { value: 70.0, at: t0() },
            Entry { value: 71.0, at: t0() },
        ];
        assert_eq!(resolve_at(&log, t0()).unwrap().value, 71.0);
    }

    #[test]
    fn setting_value_bounds_are_exclusive() {
        assert!(validate_setting_value(68.5).is_ok());
        assert!(validate_setting_value(32.0).is_err());
        assert!(validate_setting_value(100.0).is_err());
        assert!(validate_setting_value(f64::NAN).is_err());
    }

    #[test]
    fn device_validation() {
        assert!(validate_device("Lobby", 10, 20).is_ok());
        assert!(validate_device("", 10, 20).is_err());
        assert!(validate_device("Lobby", -1, 20).is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Lobby").is_ok());
    }
}
