//! Cluster evaluation against an arbitrary reference time.
//!
//! Every query is a fresh full pass over the supplied votes: decay depends
//! on the distance from each vote to the reference time, which changes with
//! every query, so nothing is cached between calls.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::clustering::{summarize_votes, ClusterParams, ClusterSummary};
use crate::error::CoreError;
use crate::types::Timestamp;
use crate::vote::VoteSample;

/// Furthest a query may look back from now, in minutes (4 hours).
pub const MAX_LOOKBACK_MINUTES: i64 = 240;

/// Furthest a query may look ahead of now, in minutes (1 hour).
pub const MAX_LOOKAHEAD_MINUTES: i64 = 60;

/// Validate a reference-time offset in minutes relative to now.
pub fn validate_offset(offset_minutes: i64) -> Result<(), CoreError> {
    if !(-MAX_LOOKBACK_MINUTES..=MAX_LOOKAHEAD_MINUTES).contains(&offset_minutes) {
        return Err(CoreError::Validation(format!(
            "offset_minutes must be between -{MAX_LOOKBACK_MINUTES} and \
             {MAX_LOOKAHEAD_MINUTES}, got {offset_minutes}"
        )));
    }
    Ok(())
}

/// The reference time for `now` shifted by `offset_minutes`.
pub fn reference_time(now: Timestamp, offset_minutes: i64) -> Timestamp {
    now + Duration::minutes(offset_minutes)
}

/// Earliest creation time that can still be visible at `reference`.
///
/// Stores may use this to narrow the rows they fetch. Saturates at the
/// earliest representable instant instead of overflowing.
pub fn visibility_start(reference: Timestamp, params: &ClusterParams) -> Timestamp {
    Duration::try_milliseconds((params.cutoff_minutes() * 60_000.0).ceil() as i64)
        .and_then(|cutoff| reference.checked_sub_signed(cutoff))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Result of a time-travel query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTravelView {
    pub reference_time: Timestamp,
    pub offset_minutes: i64,
    pub clusters: Vec<ClusterSummary>,
}

/// Re-evaluate the clusters for `votes` at `now + offset_minutes`.
pub fn query_clusters(
    votes: &[VoteSample],
    now: Timestamp,
    offset_minutes: i64,
    params: &ClusterParams,
) -> Result<TimeTravelView, CoreError> {
    validate_offset(offset_minutes)?;
    let reference = reference_time(now, offset_minutes);
    Ok(TimeTravelView {
        reference_time: reference,
        offset_minutes,
        clusters: summarize_votes(votes, reference, params),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::Sentiment;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap()
    }

    fn params() -> ClusterParams {
        ClusterParams::new(30.0, 120.0, 50.0).unwrap()
    }

    fn hot_at(x: i32, minutes_from_now: i64) -> VoteSample {
        VoteSample {
            x,
            y: 0,
            sentiment: Sentiment::Hot,
            created_at: now() + Duration::minutes(minutes_from_now),
        }
    }

    #[test]
    fn offset_bounds() {
        assert!(validate_offset(0).is_ok());
        assert!(validate_offset(-240).is_ok());
        assert!(validate_offset(60).is_ok());
        assert_matches!(validate_offset(-241), Err(CoreError::Validation(_)));
        assert_matches!(validate_offset(61), Err(CoreError::Validation(_)));
    }

    #[test]
    fn looking_back_hides_votes_that_had_not_happened_yet() {
        let votes = [hot_at(0, -90), hot_at(500, -10)];

        let present = query_clusters(&votes, now(), 0, &params()).unwrap();
        assert_eq!(present.clusters.len(), 2);

        let past = query_clusters(&votes, now(), -60, &params()).unwrap();
        assert_eq!(past.reference_time, now() - Duration::minutes(60));
        assert_eq!(past.clusters.len(), 1);
        assert_eq!(past.clusters[0].x, 0.0);
    }

    #[test]
    fn looking_ahead_decays_and_eventually_drops_votes() {
        let votes = [hot_at(0, -70)];

        let present = query_clusters(&votes, now(), 0, &params()).unwrap();
        let ahead = query_clusters(&votes, now(), 30, &params()).unwrap();
        assert!(ahead.clusters[0].intensity < present.clusters[0].intensity);

        // 70 + 60 = 130 minutes old: beyond the cutoff.
        let far = query_clusters(&votes, now(), 60, &params()).unwrap();
        assert!(far.clusters.is_empty());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let votes = [hot_at(0, -5), hot_at(10, -3), hot_at(300, -1)];
        let a = query_clusters(&votes, now(), -2, &params()).unwrap();
        let b = query_clusters(&votes, now(), -2, &params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn visibility_start_is_reference_minus_cutoff() {
        assert_eq!(
            visibility_start(now(), &params()),
            now() - Duration::minutes(120)
        );
    }

    #[test]
    fn visibility_start_saturates_near_the_earliest_instant() {
        let reference = DateTime::<Utc>::MIN_UTC + Duration::minutes(5);
        let widest = ClusterParams::new(30.0, crate::decay::MAX_CUTOFF_MINUTES, 50.0).unwrap();
        assert_eq!(visibility_start(reference, &widest), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn widest_cutoff_query_succeeds() {
        let widest = ClusterParams::new(30.0, crate::decay::MAX_CUTOFF_MINUTES, 50.0).unwrap();
        let votes = [hot_at(0, -60 * 24 * 6)];
        let view = query_clusters(&votes, now(), 0, &widest).unwrap();
        assert_eq!(visibility_start(now(), &widest), now() - Duration::days(7));
        assert_eq!(view.clusters.len(), 1);
    }
}
