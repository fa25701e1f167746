//! Time-expiring memoization of report responses.
//!
//! Entries expire lazily: expiry is checked when an entry is read, and an
//! expired entry stays in the map until the same key is written again.
//! A [`RequestSequencer`] numbers each logical fetch so that a response
//! arriving after a newer request was issued can be recognized.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = add_duration(*now, by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `at + by`, saturating at the latest representable time.
fn add_duration(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ============================================================================
// Report Cache
// ============================================================================

/// A cached value and the instant it stops being usable.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The cached value.
    pub value: V,
    /// The entry is usable while `now < expires_at`.
    pub expires_at: DateTime<Utc>,
}

/// URL-keyed cache with per-entry expiry.
#[derive(Debug)]
pub struct ReportCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> ReportCache<V> {
    /// Create an empty cache on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// The cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The value for `key`, unless it was never stored or has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        let entry = self.entries.get(key)?;
        (self.clock.now() < entry.expires_at).then_some(&entry.value)
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn put(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = add_duration(self.clock.now(), ttl);
        self.put_until(key, value, expires_at);
    }

    /// Store `value` under `key` until `expires_at`.
    pub fn put_until(&mut self, key: impl Into<String>, value: V, expires_at: DateTime<Utc>) {
        let key = key.into();
        tracing::debug!("Caching {key} until {expires_at}");
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was ever stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for ReportCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request Sequencing
// ============================================================================

/// Sequence number of one logical fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// The raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing request tickets.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    /// Create a sequencer that has issued nothing yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: 0 }
    }

    /// Issue the next ticket.
    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    /// The most recently issued ticket.
    #[must_use]
    pub const fn latest(&self) -> Option<RequestTicket> {
        if self.latest == 0 {
            None
        } else {
            Some(RequestTicket(self.latest))
        }
    }

    /// Check whether `ticket` is still the latest request.
    #[must_use]
    pub fn freshness(&self, ticket: RequestTicket) -> Freshness {
        if ticket.0 == self.latest {
            Freshness::Current
        } else {
            Freshness::Stale {
                ticket,
                latest: RequestTicket(self.latest),
            }
        }
    }
}

/// Whether a response belongs to the latest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No newer request was issued.
    Current,
    /// A newer request was issued while this one was in flight.
    Stale {
        /// The ticket of the response.
        ticket: RequestTicket,
        /// The latest issued ticket.
        latest: RequestTicket,
    },
}

impl Freshness {
    /// Returns `true` for [`Freshness::Stale`].
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// What to do with a response whose request is no longer the latest.
///
/// The response is cached either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Log the staleness and apply the response anyway.
    Keep,
    /// Log the staleness and leave the view untouched.
    #[default]
    Discard,
}

// ============================================================================
// Tests
// ============================================================================
