//! Calendar command: a month of daily counts at a glance.
//!
//! Renders a Sunday-first month grid. Every elapsed day carries a
//! marker for whether the goal was met; days still to come stay blank.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};

use reps_core::{DayRecord, Goal};
use reps_db::Database;

const WEEKDAY_HEADER: &str = "Su  Mo  Tu  We  Th  Fr  Sa";

/// Runs the calendar command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    goal: Goal,
    today: NaiveDate,
    month: Option<&str>,
) -> Result<()> {
    let first = match month {
        Some(value) => parse_month(value)?,
        None => today.with_day(1).context("invalid current date")?,
    };
    let next_month = first
        .checked_add_months(Months::new(1))
        .context("month out of range")?;

    let records = db.range(first, next_month)?;
    write!(writer, "{}", month_grid(first, today, goal, &records))?;
    Ok(())
}

/// Parses a `YYYY-MM` argument into the first day of that month.
fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .with_context(|| format!("invalid month '{value}', expected YYYY-MM"))
}

/// Renders one month as a Sunday-first grid.
///
/// Each cell is the day number plus a marker: `✓` when the goal was
/// met, `·` for an elapsed day below goal, nothing for future days. A
/// summary line counts the goal days so far; a month with no elapsed
/// days gets none.
pub fn month_grid(
    first: NaiveDate,
    today: NaiveDate,
    goal: Goal,
    records: &[DayRecord],
) -> String {
    let mut output = String::new();
    writeln!(output, "{}", first.format("%B %Y")).unwrap();
    writeln!(output, "{WEEKDAY_HEADER}").unwrap();

    let mut row: Vec<String> = Vec::with_capacity(7);
    for _ in 0..first.weekday().num_days_from_sunday() {
        row.push("   ".to_string());
    }

    let mut met = 0u32;
    let mut elapsed = 0u32;
    let mut day = first;
    while day.month() == first.month() {
        let count = records
            .iter()
            .find(|record| record.day == day)
            .map_or(0, |record| record.count);
        let marker = if day > today {
            ' '
        } else if goal.is_met(count) {
            met += 1;
            elapsed += 1;
            '✓'
        } else {
            elapsed += 1;
            '·'
        };
        row.push(format!("{:>2}{marker}", day.day()));

        if row.len() == 7 {
            writeln!(output, "{}", row.join(" ").trim_end()).unwrap();
            row.clear();
        }
        day += Duration::days(1);
    }
    if !row.is_empty() {
        writeln!(output, "{}", row.join(" ").trim_end()).unwrap();
    }

    if elapsed > 0 {
        writeln!(output).unwrap();
        writeln!(output, "Goal met on {met} of {elapsed} days").unwrap();
    }

    output
}
