/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Elapsed minutes from `earlier` to `later` as a float.
///
/// Negative when `earlier` is actually after `later`.
pub fn minutes_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn minutes_between_is_signed() {
        let t0 = Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap();
        let t1 = t0 + Duration::seconds(90);
        assert_eq!(minutes_between(t0, t1), 1.5);
        assert_eq!(minutes_between(t1, t0), -1.5);
    }
}
