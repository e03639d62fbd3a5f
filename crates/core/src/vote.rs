//! Vote sentiment codes, comfort categories, and submission validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Average sentiment below this is displayed as "cold".
pub const COLD_THRESHOLD: f64 = -0.33;

/// Average sentiment above this is displayed as "hot".
pub const HOT_THRESHOLD: f64 = 0.33;

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// One of exactly three sentiment codes a visitor can report.
///
/// Also used as the display category for an aggregated cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Cold,
    Comfortable,
    Hot,
}

impl Sentiment {
    /// The signed integer code stored for this sentiment (-1, 0, +1).
    pub fn code(self) -> i16 {
        match self {
            Sentiment::Cold => -1,
            Sentiment::Comfortable => 0,
            Sentiment::Hot => 1,
        }
    }

    /// Parse a stored or submitted code.
    pub fn from_code(code: i16) -> Result<Self, CoreError> {
        match code {
            -1 => Ok(Sentiment::Cold),
            0 => Ok(Sentiment::Comfortable),
            1 => Ok(Sentiment::Hot),
            other => Err(CoreError::Validation(format!(
                "value must be one of -1, 0, 1, got {other}"
            ))),
        }
    }

    /// Signed value as a float, for weighting.
    pub fn signed(self) -> f64 {
        f64::from(self.code())
    }
}

/// Map an average signed sentiment to its display category.
///
/// - `Cold`        -- average < -0.33
/// - `Hot`         -- average > +0.33
/// - `Comfortable` -- otherwise (including mixed clusters)
pub fn classify_average(average: f64) -> Sentiment {
    if average < COLD_THRESHOLD {
        Sentiment::Cold
    } else if average > HOT_THRESHOLD {
        Sentiment::Hot
    } else {
        Sentiment::Comfortable
    }
}

// ---------------------------------------------------------------------------
// VoteSample
// ---------------------------------------------------------------------------

/// The slice of a stored vote that the clustering engine reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteSample {
    pub x: i32,
    pub y: i32,
    pub sentiment: Sentiment,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate submitted pixel coordinates. Upper bounds are the image's
/// concern and are enforced by the caller.
pub fn validate_coordinates(x: i32, y: i32) -> Result<(), CoreError> {
    if x < 0 || y < 0 {
        return Err(CoreError::Validation(format!(
            "coordinates must be >= 0, got ({x}, {y})"
        )));
    }
    Ok(())
}

/// Validate a submitter identity string.
pub fn validate_visitor_id(visitor_id: &str) -> Result<(), CoreError> {
    if visitor_id.trim().is_empty() {
        return Err(CoreError::Validation("visitor id must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn codes_round_trip_for_all_three_sentiments() {
        for s in [Sentiment::Cold, Sentiment::Comfortable, Sentiment::Hot] {
            assert_eq!(Sentiment::from_code(s.code()).unwrap(), s);
        }
    }

    #[test]
    fn out_of_range_code_is_validation_error() {
        assert_matches!(Sentiment::from_code(2), Err(CoreError::Validation(_)));
        assert_matches!(Sentiment::from_code(-2), Err(CoreError::Validation(_)));
    }

    #[test]
    fn classify_average_boundaries() {
        assert_eq!(classify_average(-1.0), Sentiment::Cold);
        assert_eq!(classify_average(-0.34), Sentiment::Cold);
        assert_eq!(classify_average(-0.33), Sentiment::Comfortable);
        assert_eq!(classify_average(0.0), Sentiment::Comfortable);
        assert_eq!(classify_average(0.33), Sentiment::Comfortable);
        assert_eq!(classify_average(0.34), Sentiment::Hot);
    }

    #[test]
    fn negative_coordinates_rejected() {
        assert!(validate_coordinates(0, 0).is_ok());
        assert!(validate_coordinates(-1, 5).is_err());
        assert!(validate_coordinates(5, -1).is_err());
    }

    #[test]
    fn blank_visitor_rejected() {
        assert!(validate_visitor_id("  ").is_err());
        assert!(validate_visitor_id("a1b2").is_ok());
    }

    #[test]
    fn sentiment_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Comfortable).unwrap(),
            "\"comfortable\""
        );
    }
}
