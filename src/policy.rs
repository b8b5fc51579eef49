//! Retention policy: grace period and keep-tag exclusion.
//!
//! Both policies are pure decisions over data the caller already holds; the
//! clock is injected so the cutoff boundary is testable.

use chrono::{DateTime, Duration, Utc};

/// Minimum elapsed time since last playback before an item becomes eligible
/// for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GracePeriod {
    /// Grace period length in days.
    days: u32,
}

impl GracePeriod {
    /// Creates a grace period of the given length in days.
    #[must_use]
    pub const fn new(days: u32) -> Self {
        Self { days }
    }

    /// The configured length in days.
    #[must_use]
    pub const fn days(self) -> u32 {
        self.days
    }

    /// The eligibility cutoff for the given instant.
    ///
    /// Items last played strictly before this point are past the grace
    /// period.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }

    /// Whether an item last played at `last_played` is past the grace period
    /// at `now`.
    ///
    /// Strict inequality: a timestamp exactly at the cutoff is NOT eligible.
    #[must_use]
    pub fn is_past(self, last_played: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        last_played < self.cutoff(now)
    }
}

/// Tag-based deletion exclusion for one catalog service.
///
/// Holds the resolved keep-tag id, or `None` when the configured label does
/// not exist in that service's tag list. Absence never matches, so a missing
/// label leaves every item eligible (fail-open). This mirrors the upstream
/// behavior and is intentionally not hardened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepTag {
    id: Option<i64>,
}

impl KeepTag {
    /// Wraps a resolved tag id (or its absence).
    #[must_use]
    pub const fn new(id: Option<i64>) -> Self {
        Self { id }
    }

    /// A keep tag that never excludes anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { id: None }
    }

    /// The resolved tag id, if the label was found.
    #[must_use]
    pub const fn id(self) -> Option<i64> {
        self.id
    }

    /// Whether an item carrying `tags` is excluded from deletion.
    #[must_use]
    pub fn excludes(self, tags: &[i64]) -> bool {
        self.id.is_some_and(|id| tags.contains(&id))
    }
}
