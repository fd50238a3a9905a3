//! Report command for summarizing counts over time.
//!
//! This module implements `reps report`: a dense trailing week, the
//! running totals and streaks, and the rolling average over active days.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use reps_core::{DayExport, Goal, average_over_window, dense_week};
use reps_db::Database;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub timezone: String,
    pub goal: u32,
    pub window_days: u32,
    pub average: u32,
    pub total_count: u64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub week: Vec<DayExport>,
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar of `count` against `goal`.
/// Non-zero counts under 5% of goal get a single block for visibility.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_bar(count: u32, goal: u32) -> String {
    if goal == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = f64::from(count) / f64::from(goal);
    let filled = if ratio < 0.05 && count > 0 {
        1
    } else {
        // Counts past the goal clamp to a full bar
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Generates report data from the database.
pub fn generate_report_data(
    db: &Database,
    goal: Goal,
    today: NaiveDate,
    window_days: u32,
    generated_at: DateTime<Utc>,
) -> Result<ReportData> {
    let stats = db.stats()?;
    let average = average_over_window(db, today, window_days)?;
    let records = db.range(today - Duration::days(6), today + Duration::days(1))?;
    let week = dense_week(today, &records, goal);

    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());

    Ok(ReportData {
        generated_at,
        today,
        timezone,
        goal: goal.get(),
        window_days,
        average,
        total_count: stats.total_count,
        current_streak: stats.current_streak,
        best_streak: stats.best_streak,
        week,
    })
}

/// Pluralizes a day count for display.
fn format_days(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "REP REPORT: {}", data.today.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output, "Timezone: {}", data.timezone).unwrap();

    if data.total_count == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No reps recorded yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'reps monitor' to start a session, or 'reps add' to count one by hand."
        )
        .unwrap();
        return output;
    }

    // LAST 7 DAYS section
    writeln!(output).unwrap();
    writeln!(output, "LAST 7 DAYS").unwrap();
    writeln!(output, "───────────").unwrap();
    for day in &data.week {
        let bar = progress_bar(day.count, day.goal);
        let marker = if day.count >= day.goal { " ✓" } else { "" };
        writeln!(
            output,
            "{} {:>4}  {bar}{marker}",
            day.date.format("%a %b %e"),
            day.count
        )
        .unwrap();
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Daily goal:     {} reps", data.goal).unwrap();
    writeln!(output, "Total reps:     {}", data.total_count).unwrap();
    writeln!(output, "Current streak: {}", format_days(data.current_streak)).unwrap();
    writeln!(output, "Best streak:    {}", format_days(data.best_streak)).unwrap();
    writeln!(
        output,
        "Daily average:  {} reps per active day (last {} days)",
        data.average, data.window_days
    )
    .unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub today: String,
    pub goal: u32,
    pub totals: JsonTotals,
    pub average: JsonAverage,
    pub last_7_days: Vec<JsonDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub total_count: u64,
    pub current_streak: u32,
    pub best_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct JsonAverage {
    pub window_days: u32,
    pub reps_per_active_day: u32,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub count: u32,
    pub goal_met: bool,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: data.timezone.clone(),
        today: data.today.format("%Y-%m-%d").to_string(),
        goal: data.goal,
        totals: JsonTotals {
            total_count: data.total_count,
            current_streak: data.current_streak,
            best_streak: data.best_streak,
        },
        average: JsonAverage {
            window_days: data.window_days,
            reps_per_active_day: data.average,
        },
        last_7_days: data
            .week
            .iter()
            .map(|day| JsonDay {
                date: day.date.format("%Y-%m-%d").to_string(),
                count: day.count,
                goal_met: day.count >= day.goal,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(db: &Database, goal: Goal, today: NaiveDate, window_days: u32, json: bool) -> Result<()> {
    anyhow::ensure!(window_days > 0, "average window must be at least 1 day");

    let generated_at = Utc::now();
    let data = generate_report_data(db, goal, today, window_days, generated_at)?;

    if json {
        let output = format_report_json(&data)?;
        println!("{output}");
    } else {
        let output = format_report(&data);
        print!("{output}");
    }

    Ok(())
}
