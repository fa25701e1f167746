//! Prev/next navigation between reports.
//!
//! Domain, owner and proposal reports step through ordered key lists
//! delivered by the server. Month and year reports step arithmetically,
//! bounded by the range of months that have report data.

use chrono::{DateTime, Datelike, Utc};

use crate::constants::{FIRST_REPORT_MONTH, FIRST_REPORT_YEAR};
use crate::domain::TimeBucket;

// ============================================================================
// Navigation Index
// ============================================================================

/// Where the current key sits in a navigation index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// A previous entry exists.
    pub has_prev: bool,
    /// A next entry exists.
    pub has_next: bool,
    /// Key of the previous entry.
    pub prev_key: Option<String>,
    /// Key of the next entry.
    pub next_key: Option<String>,
}

impl Position {
    /// Both directions disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// An ordered list of unique navigable keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationIndex {
    keys: Vec<String>,
}

impl NavigationIndex {
    /// Build an index; later duplicates of a key are dropped.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self { keys: unique }
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// The keys, in order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Locate `current` and report its neighbours.
    ///
    /// A key that is not in the index disables both directions.
    #[must_use]
    pub fn locate(&self, current: &str) -> Position {
        let Some(index) = self.keys.iter().position(|k| k == current) else {
            return Position::disabled();
        };
        let prev_key = index
            .checked_sub(1)
            .and_then(|i| self.keys.get(i))
            .cloned();
        let next_key = self.keys.get(index + 1).cloned();
        Position {
            has_prev: prev_key.is_some(),
            has_next: next_key.is_some(),
            prev_key,
            next_key,
        }
    }
}

// ============================================================================
// Time Buckets
// ============================================================================

/// Step a month by `delta`, carrying into the year.
///
/// Returns `None` when the resulting year does not fit an `i32`.
#[must_use]
pub fn advance_month(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
    Some((year, month))
}

/// Step a year by `delta`; `None` on overflow.
#[must_use]
pub const fn advance_year(year: i32, delta: i32) -> Option<i32> {
    year.checked_add(delta)
}

/// The span of months that have report data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportRange {
    /// First year with data.
    pub min_year: i32,
    /// First month (1-12) of `min_year` with data.
    pub min_month: u32,
    /// Last year with data.
    pub max_year: i32,
    /// Last month (1-12) of `max_year` with data.
    pub max_month: u32,
}

impl ReportRange {
    /// Create a range from its first and last month.
    #[must_use]
    pub const fn new(min_year: i32, min_month: u32, max_year: i32, max_month: u32) -> Self {
        Self {
            min_year,
            min_month,
            max_year,
            max_month,
        }
    }

    /// From the first month with report data through the month of `now`.
    #[must_use]
    pub fn through(now: DateTime<Utc>) -> Self {
        Self::new(FIRST_REPORT_YEAR, FIRST_REPORT_MONTH, now.year(), now.month())
    }

    /// Returns `true` if the bucket lies within the range.
    #[must_use]
    pub fn contains(&self, bucket: TimeBucket) -> bool {
        match bucket {
            TimeBucket::Year(year) => (self.min_year..=self.max_year).contains(&year),
            TimeBucket::Month { year, month } => {
                (self.min_year, self.min_month) <= (year, month)
                    && (year, month) <= (self.max_year, self.max_month)
            }
        }
    }

    /// Step a bucket by `delta`; `None` when the result leaves the range.
    #[must_use]
    pub fn step(&self, bucket: TimeBucket, delta: i32) -> Option<TimeBucket> {
        let next = match bucket {
            TimeBucket::Year(year) => TimeBucket::Year(advance_year(year, delta)?),
            TimeBucket::Month { year, month } => {
                let (year, month) = advance_month(year, month, delta)?;
                TimeBucket::Month { year, month }
            }
        };
        self.contains(next).then_some(next)
    }

    /// Prev/next availability for a bucket.
    ///
    /// Buckets outside the range have neither.
    #[must_use]
    pub fn locate(&self, bucket: TimeBucket) -> Position {
        if !self.contains(bucket) {
            return Position::disabled();
        }
        let prev_key = self.step(bucket, -1).map(|b| b.to_string());
        let next_key = self.step(bucket, 1).map(|b| b.to_string());
        Position {
            has_prev: prev_key.is_some(),
            has_next: next_key.is_some(),
            prev_key,
            next_key,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
