//! Manual count adjustment: the `add` and `sub` commands.
//!
//! Both commands funnel into [`run`] with a signed delta; the store
//! clamps the count at zero and reports the delta actually applied.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use reps_core::Goal;
use reps_db::Database;

use crate::commands::report::progress_bar;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    goal: Goal,
    delta: i32,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    let change = db.record_completion(today, delta, goal, today, now)?;
    tracing::info!(
        day = %change.day,
        previous = change.previous,
        new = change.new,
        "count adjusted"
    );

    if delta < 0 && change.applied() > i64::from(delta) {
        if change.applied() == 0 {
            writeln!(writer, "Already at 0; nothing removed.")?;
        } else {
            writeln!(writer, "Removed {} (count stops at 0).", -change.applied())?;
        }
    }

    writeln!(
        writer,
        "Today: {} / {goal} reps  {}",
        change.new,
        progress_bar(change.new, goal.get())
    )?;

    // Announce the goal the moment a mutation crosses it.
    if !goal.is_met(change.previous) && goal.is_met(change.new) {
        writeln!(writer, "Goal reached!")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn fixture() -> (Database, Goal, NaiveDate, DateTime<Utc>) {
        let db = Database::open_in_memory().unwrap();
        let goal = Goal::new(30).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        (db, goal, today, now)
    }

    #[test]
    fn add_reports_the_new_count() {
        let (mut db, goal, today, now) = fixture();

        let mut output = Vec::new();
        run(&mut output, &mut db, goal, 5, today, now).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Today: 5 / 30 reps  ██░░░░░░░░
        ");
        assert_eq!(db.count_on(today).unwrap(), 5);
    }

    #[test]
    fn crossing_the_goal_is_announced_once() {
        let (mut db, goal, today, now) = fixture();
        db.record_completion(today, 29, goal, today, now).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut db, goal, 1, today, now).unwrap();
        let crossing = String::from_utf8(output).unwrap();
        assert!(crossing.contains("Goal reached!"));

        // Already past the goal: no repeat announcement.
        let mut output = Vec::new();
        run(&mut output, &mut db, goal, 1, today, now).unwrap();
        let past = String::from_utf8(output).unwrap();
        assert!(!past.contains("Goal reached!"));
    }

    #[test]
    fn sub_clamps_at_zero_on_an_empty_day() {
        let (mut db, goal, today, now) = fixture();

        let mut output = Vec::new();
        run(&mut output, &mut db, goal, -1, today, now).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Already at 0; nothing removed.
        Today: 0 / 30 reps  ░░░░░░░░░░
        ");
    }

    #[test]
    fn sub_reports_a_partial_removal() {
        let (mut db, goal, today, now) = fixture();
        db.record_completion(today, 3, goal, today, now).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut db, goal, -5, today, now).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Removed 3 (count stops at 0).
        Today: 0 / 30 reps  ░░░░░░░░░░
        ");
    }

    #[test]
    fn sub_within_the_count_is_quiet() {
        let (mut db, goal, today, now) = fixture();
        db.record_completion(today, 10, goal, today, now).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut db, goal, -4, today, now).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(!output.contains("stops at 0"));
        assert_eq!(db.count_on(today).unwrap(), 6);
    }
}
