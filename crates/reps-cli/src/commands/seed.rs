//! Seed command: generate demo history.
//!
//! Fills the trailing days with random counts between zero and a little
//! past the goal, committed through the normal mutation path so the
//! running total and streaks stay consistent with the day rows. Useful
//! for trying the reporting commands without a sensor stream.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;

use reps_core::Goal;
use reps_db::Database;

/// Headroom above the goal for generated counts.
const OVERSHOOT: u32 = 15;

pub fn run<W: Write, R: Rng>(
    writer: &mut W,
    db: &mut Database,
    rng: &mut R,
    goal: Goal,
    days: u32,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    anyhow::ensure!(days > 0, "must seed at least 1 day");

    let mut seeded: u64 = 0;
    for back in (0..days).rev() {
        let day = today - Duration::days(i64::from(back));
        let count = rng.gen_range(0..=goal.get() + OVERSHOOT);
        if count == 0 {
            // A rest day: no record at all, same as never opening the app.
            continue;
        }
        let change = db.record_completion(day, i32::try_from(count)?, goal, today, now)?;
        seeded += u64::from(change.new) - u64::from(change.previous);
    }
    tracing::info!(days, seeded, "demo history seeded");

    writeln!(writer, "Seeded {days} days of history ({seeded} reps)")?;
    Ok(())
}
