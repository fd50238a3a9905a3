//! Core domain logic for the rep counter.
//!
//! This crate contains the fundamental types and logic for:
//! - Detection: folding device-tilt samples into repetition events
//! - Statistics: goal streaks, running totals, and rolling averages
//! - Day bucketing: mapping instants to local calendar days
//! - Export: the snapshot payload read by display surfaces

pub mod day;
pub mod detector;
pub mod export;
pub mod stats;

pub use day::{DayBucketer, DayRecord};
pub use detector::{
    ConfigError, DetectorConfig, RejectReason, RepDetector, RepEvent, RepEventKind, SessionTally,
    TiltSample,
};
pub use export::{DayExport, ExportPayload, dense_week};
pub use stats::{
    DailyCounts, Goal, InvalidGoal, UserStats, apply_count_change, average_over_window,
    current_streak, recompute_streaks,
};
