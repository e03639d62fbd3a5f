//! Vote rate limiting.
//!
//! Two independent gates run before a vote is accepted:
//!
//! - a per-(floor-plan, visitor) cooldown: the latest accepted vote from the
//!   same visitor must be at least [`DEFAULT_COOLDOWN_MINUTES`] old;
//! - a per-origin-address sliding window ([`AddressThrottle`]).
//!
//! The cooldown is a point check against the latest prior record, so it has
//! to be serialized per key to prevent a double accept inside the window.
//! [`KeyedLocks`] provides that single-flight lock.

use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum spacing between two accepted votes from one visitor.
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 10;

/// Submissions allowed per origin address inside one window.
pub const DEFAULT_ADDRESS_LIMIT: usize = 30;

/// Length of the per-address window in seconds (1 hour).
pub const DEFAULT_ADDRESS_WINDOW_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Cooldown
// ---------------------------------------------------------------------------

/// Reject when the last accepted vote is younger than `cooldown`.
///
/// `RateLimited` carries the whole seconds remaining (rounded up).
pub fn check_cooldown(
    last_accepted_at: Option<Timestamp>,
    now: Timestamp,
    cooldown: Duration,
) -> Result<(), CoreError> {
    let Some(last) = last_accepted_at else {
        return Ok(());
    };
    let age = now - last;
    if age >= cooldown {
        return Ok(());
    }
    Err(CoreError::RateLimited {
        retry_after_secs: ceil_secs(cooldown - age),
    })
}

fn ceil_secs(d: Duration) -> u64 {
    let ms = d.num_milliseconds().max(0) as u64;
    ms.div_ceil(1000)
}

// ---------------------------------------------------------------------------
// AddressThrottle
// ---------------------------------------------------------------------------

/// Sliding-window counter of submissions per origin address.
pub struct AddressThrottle {
    hits: DashMap<String, VecDeque<Timestamp>>,
    limit: usize,
    window: Duration,
}

impl AddressThrottle {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            hits: DashMap::new(),
            limit,
            window,
        }
    }

    /// Record a submission from `address` unless the window is full.
    pub fn check_and_record(&self, address: &str, now: Timestamp) -> Result<(), CoreError> {
        let cutoff = now - self.window;
        let mut entry = self.hits.entry(address.to_string()).or_default();

        while entry.front().is_some_and(|&t| t <= cutoff) {
            entry.pop_front();
        }

        if entry.len() >= self.limit {
            let retry_after_secs = entry
                .front()
                .map(|&oldest| ceil_secs(oldest + self.window - now))
                .unwrap_or(1);
            return Err(CoreError::RateLimited { retry_after_secs });
        }

        entry.push_back(now);
        Ok(())
    }

    /// Drop addresses with no submissions inside the window.
    pub fn cleanup(&self, now: Timestamp) {
        let cutoff = now - self.window;
        self.hits.retain(|_, hits| {
            hits.retain(|&t| t > cutoff);
            !hits.is_empty()
        });
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.hits.len()
    }
}

impl Default for AddressThrottle {
    fn default() -> Self {
        Self::new(
            DEFAULT_ADDRESS_LIMIT,
            Duration::seconds(DEFAULT_ADDRESS_WINDOW_SECS),
        )
    }
}

// ---------------------------------------------------------------------------
// KeyedLocks
// ---------------------------------------------------------------------------

/// One async mutex per key, created on demand.
///
/// Different keys never contend; holders of the same key run one at a time.
pub struct KeyedLocks<K: Eq + Hash> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let mutex = self.locks.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    /// Forget keys nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.retain(|_, m| Arc::strong_count(m) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RateLimiter
// ---------------------------------------------------------------------------

/// Key for the per-identity gate.
pub type IdentityKey = (DbId, String);

/// Rate limiting policy shared by all ingestion requests.
pub struct RateLimiter {
    enabled: bool,
    cooldown: Duration,
    addresses: AddressThrottle,
    identities: KeyedLocks<IdentityKey>,
}

impl RateLimiter {
    pub fn new(enabled: bool, cooldown: Duration, addresses: AddressThrottle) -> Self {
        Self {
            enabled,
            cooldown,
            addresses,
            identities: KeyedLocks::new(),
        }
    }

    /// A limiter that lets everything through (development mode).
    pub fn disabled() -> Self {
        Self::new(false, Duration::zero(), AddressThrottle::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Serialize submissions from one visitor on one floor-plan.
    ///
    /// Hold the guard across "read latest vote", the cooldown check, and the
    /// store append.
    pub async fn acquire(&self, floorplan_id: DbId, visitor_id: &str) -> OwnedMutexGuard<()> {
        self.identities
            .lock((floorplan_id, visitor_id.to_string()))
            .await
    }

    /// Per-identity cooldown check.
    pub fn check_cooldown(
        &self,
        last_accepted_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        if !self.enabled {
            return Ok(());
        }
        check_cooldown(last_accepted_at, now, self.cooldown)
    }

    /// Per-address throttle check; records the attempt when allowed.
    pub fn check_address(&self, address: &str, now: Timestamp) -> Result<(), CoreError> {
        if !self.enabled {
            return Ok(());
        }
        self.addresses.check_and_record(address, now)
    }

    /// Release idle bookkeeping.
    pub fn cleanup(&self, now: Timestamp) {
        self.addresses.cleanup(now);
        self.identities.prune();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            true,
            Duration::minutes(DEFAULT_COOLDOWN_MINUTES),
            AddressThrottle::default(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap()
    }

    fn cooldown() -> Duration {
        Duration::minutes(DEFAULT_COOLDOWN_MINUTES)
    }

    // -- cooldown -------------------------------------------------------------

    #[test]
    fn first_vote_is_always_allowed() {
        assert!(check_cooldown(None, t0(), cooldown()).is_ok());
    }

    #[test]
    fn second_vote_five_minutes_later_is_rejected() {
        let result = check_cooldown(Some(t0()), t0() + Duration::minutes(5), cooldown());
        assert_matches!(
            result,
            Err(CoreError::RateLimited {
                retry_after_secs: 300
            })
        );
    }

    #[test]
    fn second_vote_eleven_minutes_later_is_accepted() {
        assert!(check_cooldown(Some(t0()), t0() + Duration::minutes(11), cooldown()).is_ok());
    }

    #[test]
    fn vote_exactly_at_cooldown_is_accepted() {
        assert!(check_cooldown(Some(t0()), t0() + Duration::minutes(10), cooldown()).is_ok());
    }

    #[test]
    fn retry_after_rounds_up() {
        let now = t0() + Duration::minutes(9) + Duration::milliseconds(59_500);
        assert_matches!(
            check_cooldown(Some(t0()), now, cooldown()),
            Err(CoreError::RateLimited {
                retry_after_secs: 1
            })
        );
    }

    #[test]
    fn disabled_limiter_skips_cooldown() {
        let limiter = RateLimiter::disabled();
        assert!(limiter
            .check_cooldown(Some(t0()), t0() + Duration::seconds(1))
            .is_ok());
    }

    // -- address throttle -----------------------------------------------------

    #[test]
    fn address_throttle_blocks_after_limit() {
        let throttle = AddressThrottle::new(3, Duration::minutes(60));
        for i in 0..3 {
            assert!(throttle
                .check_and_record("10.0.0.1", t0() + Duration::minutes(i))
                .is_ok());
        }
        let blocked = throttle.check_and_record("10.0.0.1", t0() + Duration::minutes(10));
        // Oldest hit (t0) leaves the window at t0 + 60m: 50 minutes away.
        assert_matches!(
            blocked,
            Err(CoreError::RateLimited {
                retry_after_secs: 3000
            })
        );
        // Other addresses are unaffected.
        assert!(throttle.check_and_record("10.0.0.2", t0()).is_ok());
    }

    #[test]
    fn address_throttle_window_slides() {
        let throttle = AddressThrottle::new(1, Duration::minutes(60));
        assert!(throttle.check_and_record("a", t0()).is_ok());
        assert!(throttle
            .check_and_record("a", t0() + Duration::minutes(30))
            .is_err());
        assert!(throttle
            .check_and_record("a", t0() + Duration::minutes(61))
            .is_ok());
    }

    #[test]
    fn rejected_attempts_are_not_recorded() {
        let throttle = AddressThrottle::new(1, Duration::minutes(60));
        assert!(throttle.check_and_record("a", t0()).is_ok());
        assert!(throttle
            .check_and_record("a", t0() + Duration::minutes(59))
            .is_err());
        assert!(throttle
            .check_and_record("a", t0() + Duration::minutes(60))
            .is_ok());
    }

    #[test]
    fn cleanup_drops_idle_addresses() {
        let throttle = AddressThrottle::new(5, Duration::minutes(60));
        throttle.check_and_record("a", t0()).unwrap();
        throttle
            .check_and_record("b", t0() + Duration::minutes(50))
            .unwrap();
        throttle.cleanup(t0() + Duration::minutes(70));
        assert_eq!(throttle.tracked(), 1);
    }

    // -- keyed locks ----------------------------------------------------------

    #[tokio::test]
    async fn same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::<u32>::new());
        let guard = locks.lock(1).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock(1).await;
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = KeyedLocks::<u32>::new();
        let _a = locks.lock(1).await;
        let _b = locks.lock(2).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn prune_keeps_held_keys() {
        let locks = KeyedLocks::<u32>::new();
        let held = locks.lock(1).await;
        drop(locks.lock(2).await);
        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }
}
