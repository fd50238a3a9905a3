//! Goal streaks, running totals, and rolling averages.
//!
//! The functions here are pure: they read per-day counts through the
//! [`DailyCounts`] trait and fold changes into [`UserStats`] values the
//! caller owns. The storage layer composes them inside its write
//! transaction, so a reader never observes a day count without the
//! matching statistics.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// How many days back a streak scan will look.
///
/// A streak that genuinely exceeds the bound is reported as the bound.
pub const STREAK_LOOKBACK_DAYS: u32 = 60;

/// Default window for rolling averages, in days.
pub const DEFAULT_AVERAGE_WINDOW_DAYS: u32 = 30;

/// A goal of zero repetitions per day.
#[derive(Debug, Error)]
#[error("daily goal must be at least 1 repetition")]
pub struct InvalidGoal;

/// A daily repetition goal. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Goal(u32);

impl Goal {
    /// Validates and wraps a goal value.
    pub const fn new(reps_per_day: u32) -> Result<Self, InvalidGoal> {
        if reps_per_day == 0 {
            Err(InvalidGoal)
        } else {
            Ok(Self(reps_per_day))
        }
    }

    /// The goal in repetitions per day.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether `count` meets the goal.
    pub const fn is_met(self, count: u32) -> bool {
        count >= self.0
    }

    /// Fraction of the goal met by `count`, clamped to 1.0.
    pub fn fraction_met(self, count: u32) -> f64 {
        (f64::from(count) / f64::from(self.0)).min(1.0)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global statistics maintained across all recorded days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    /// Longest goal streak ever observed. Never decreases.
    pub best_streak: u32,
    /// Consecutive days ending today on which the goal was met.
    pub current_streak: u32,
    /// Sum of every recorded day count.
    pub total_count: u64,
    /// When a mutation last changed these statistics.
    pub last_updated: DateTime<Utc>,
}

impl UserStats {
    /// Statistics for a store with no recorded days.
    pub const fn empty(now: DateTime<Utc>) -> Self {
        Self {
            best_streak: 0,
            current_streak: 0,
            total_count: 0,
            last_updated: now,
        }
    }
}

/// Read access to per-day counts.
///
/// Implemented by the storage layer and by in-memory fixtures, so the
/// aggregation functions stay independent of where counts live. A read
/// failure propagates to the caller; it is never coerced to zero.
pub trait DailyCounts {
    type Error;

    /// The count recorded for `day`, or 0 when the day has no record.
    fn count_on(&self, day: NaiveDate) -> Result<u32, Self::Error>;
}

/// Folds a single day-count change into the running totals.
///
/// The total moves by `new - previous` without rescanning the store.
/// When `previous == new` nothing changes, `last_updated` included.
pub fn apply_count_change(stats: &mut UserStats, previous: u32, new: u32, now: DateTime<Utc>) {
    if previous == new {
        return;
    }
    if new >= previous {
        stats.total_count += u64::from(new - previous);
    } else {
        stats.total_count = stats.total_count.saturating_sub(u64::from(previous - new));
    }
    stats.last_updated = now;
}

/// Number of consecutive days ending at `today` on which the goal was met.
///
/// `today` itself must meet the goal for the streak to be non-zero; a
/// day still in progress does not count until it gets there. The scan
/// walks backward and stops at the first day below goal, or after
/// [`STREAK_LOOKBACK_DAYS`] days.
pub fn current_streak<C: DailyCounts>(
    counts: &C,
    today: NaiveDate,
    goal: Goal,
) -> Result<u32, C::Error> {
    let mut streak = 0;
    let mut day = today;
    while streak < STREAK_LOOKBACK_DAYS {
        if !goal.is_met(counts.count_on(day)?) {
            break;
        }
        streak += 1;
        day -= Duration::days(1);
    }
    Ok(streak)
}

/// Recomputes the current streak and raises the best streak if beaten.
///
/// The best streak only ever grows; a broken run leaves it where it was.
pub fn recompute_streaks<C: DailyCounts>(
    stats: &mut UserStats,
    counts: &C,
    today: NaiveDate,
    goal: Goal,
) -> Result<(), C::Error> {
    stats.current_streak = current_streak(counts, today, goal)?;
    if stats.current_streak > stats.best_streak {
        stats.best_streak = stats.current_streak;
    }
    Ok(())
}

/// Average count over the active days in the trailing window.
///
/// The window spans `window_days` calendar days ending at `today`,
/// inclusive. Days with no record and days recorded as zero are left
/// out of both the sum and the divisor; a window with no active days
/// averages to 0. The division truncates.
pub fn average_over_window<C: DailyCounts>(
    counts: &C,
    today: NaiveDate,
    window_days: u32,
) -> Result<u32, C::Error> {
    let mut sum: u64 = 0;
    let mut active_days: u64 = 0;
    for back in 0..window_days {
        let count = counts.count_on(today - Duration::days(i64::from(back)))?;
        if count > 0 {
            sum += u64::from(count);
            active_days += 1;
        }
    }
    if active_days == 0 {
        return Ok(0);
    }
    // The average of u32 values cannot exceed u32::MAX.
    Ok(u32::try_from(sum / active_days).unwrap_or(u32::MAX))
}
