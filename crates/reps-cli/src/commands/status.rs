//! Status command for today's progress at a glance.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use reps_core::Goal;
use reps_db::Database;

use crate::commands::report::progress_bar;

pub fn run<W: Write>(writer: &mut W, db: &Database, goal: Goal, today: NaiveDate) -> Result<()> {
    let today_count = db.count_on(today)?;
    let stats = db.stats()?;

    writeln!(writer, "Reps for {}", today.format("%A, %b %-d, %Y"))?;
    writeln!(
        writer,
        "Today: {today_count} / {goal} reps  {}",
        progress_bar(today_count, goal.get())
    )?;
    if goal.is_met(today_count) {
        writeln!(writer, "Goal reached!")?;
    }
    writeln!(
        writer,
        "Streak: {} days (best {})",
        stats.current_streak, stats.best_streak
    )?;
    writeln!(writer, "Total: {} reps", stats.total_count)?;

    Ok(())
}
