//! Snapshot payload for external display surfaces.
//!
//! The payload is a self-contained summary of the store: readers render
//! it without querying anything else, so it carries today's progress,
//! a dense trailing week, and the global statistics together.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::day::DayRecord;
use crate::stats::{Goal, UserStats};

/// Days covered by the trailing week in the payload.
pub const EXPORT_WEEK_DAYS: i64 = 7;

/// One day of the exported week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayExport {
    pub date: NaiveDate,
    pub count: u32,
    pub goal: u32,
}

/// The snapshot consumed by the display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub today_count: u32,
    pub goal: u32,
    pub last_7_days: Vec<DayExport>,
    pub best_streak: u32,
    pub current_streak: u32,
    pub total_count: u64,
}

/// Builds the dense trailing week ending on `today`, oldest first.
///
/// Days missing from `records` are filled with a zero count, so the
/// result always has exactly [`EXPORT_WEEK_DAYS`] entries. Records
/// outside the window are ignored.
pub fn dense_week(today: NaiveDate, records: &[DayRecord], goal: Goal) -> Vec<DayExport> {
    (0..EXPORT_WEEK_DAYS)
        .map(|back| {
            let date = today - Duration::days(EXPORT_WEEK_DAYS - 1 - back);
            let count = records
                .iter()
                .find(|record| record.day == date)
                .map_or(0, |record| record.count);
            DayExport {
                date,
                count,
                goal: goal.get(),
            }
        })
        .collect()
}

impl ExportPayload {
    /// Assembles a snapshot from the store's view of the trailing week
    /// and the statistics singleton.
    pub fn snapshot(today: NaiveDate, records: &[DayRecord], stats: &UserStats, goal: Goal) -> Self {
        let last_7_days = dense_week(today, records, goal);
        let today_count = last_7_days.last().map_or(0, |day| day.count);
        Self {
            today_count,
            goal: goal.get(),
            last_7_days,
            best_streak: stats.best_streak,
            current_streak: stats.current_streak,
            total_count: stats.total_count,
        }
    }
}
