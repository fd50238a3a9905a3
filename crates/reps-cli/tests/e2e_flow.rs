//! End-to-end tests for the rep counter binary.
//!
//! Drives the built `reps` binary the way a user would: manual count
//! adjustments, a monitor session over a recorded sample stream, goal
//! changes, and the exported snapshot payload.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

fn reps_binary() -> String {
    env!("CARGO_BIN_EXE_reps").to_string()
}

/// Writes a config file pointing the database and snapshot into `temp`.
fn write_config(temp: &Path) -> PathBuf {
    let config_file = temp.join("config.toml");
    std::fs::write(
        &config_file,
        format!(
            "database_path = \"{}\"\nsnapshot_path = \"{}\"\n",
            temp.join("reps.db").display(),
            temp.join("snapshot.json").display(),
        ),
    )
    .unwrap();
    config_file
}

fn reps(config: &Path, args: &[&str]) -> Output {
    Command::new(reps_binary())
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run reps")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn sample_line(at: DateTime<Utc>, angle: f64) -> String {
    format!(r#"{{"timestamp":"{}","angle_deg":{angle}}}"#, at.to_rfc3339())
}

/// One full sweep: down past the squat threshold, back upright.
fn sweep(at: DateTime<Utc>) -> [String; 2] {
    [
        sample_line(at, 50.0),
        sample_line(at + Duration::milliseconds(500), 5.0),
    ]
}

/// Test manual adds flow through to the status display.
#[test]
fn test_add_then_status_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let add = stdout_of(&reps(&config, &["add", "5"]));
    assert!(add.contains("5 / 30 reps"), "{add}");

    let status = stdout_of(&reps(&config, &["status"]));
    assert!(status.contains("5 / 30 reps"), "{status}");
    assert!(status.contains("Total: 5 reps"), "{status}");
}

/// Test subtracting past zero clamps instead of failing.
#[test]
fn test_sub_clamps_at_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let sub = stdout_of(&reps(&config, &["sub", "3"]));
    assert!(sub.contains("Already at 0"), "{sub}");

    let status = stdout_of(&reps(&config, &["status"]));
    assert!(status.contains("0 / 30 reps"), "{status}");
}

/// Test a monitor session counts reps from a recorded sample file.
#[test]
fn test_monitor_counts_reps_from_sample_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let t0 = Utc::now() - Duration::seconds(10);
    let mut lines = Vec::new();
    lines.extend(sweep(t0));
    lines.extend(sweep(t0 + Duration::seconds(3)));
    let input = temp.path().join("session.jsonl");
    std::fs::write(&input, lines.join("\n")).unwrap();

    let monitor = stdout_of(&reps(
        &config,
        &["monitor", "--input", input.to_str().unwrap()],
    ));
    assert!(monitor.contains("2 reps from 4 samples"), "{monitor}");

    // The committed reps show up in the totals.
    let report = stdout_of(&reps(&config, &["report", "--json"]));
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["totals"]["total_count"], 2);
}

/// Test monitor falls back to stdin when no input file is given.
#[test]
fn test_monitor_reads_samples_from_stdin() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let t0 = Utc::now() - Duration::seconds(10);
    let mut child = Command::new(reps_binary())
        .arg("--config")
        .arg(&config)
        .arg("monitor")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(sweep(t0).join("\n").as_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 reps from 2 samples"), "{stdout}");
}

/// Test malformed sample lines are skipped, not fatal.
#[test]
fn test_monitor_skips_unreadable_lines() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let t0 = Utc::now() - Duration::seconds(10);
    let [down, up] = sweep(t0);
    let input = temp.path().join("session.jsonl");
    std::fs::write(&input, [down, "garbage".to_string(), up].join("\n")).unwrap();

    let monitor = stdout_of(&reps(
        &config,
        &["monitor", "--input", input.to_str().unwrap()],
    ));
    assert!(monitor.contains("1 reps"), "{monitor}");
    assert!(monitor.contains("1 unreadable lines skipped"), "{monitor}");
}

/// Test the export payload carries the goal, totals, and a dense week.
#[test]
fn test_export_writes_snapshot_payload() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    stdout_of(&reps(&config, &["add", "7"]));

    let out_path = temp.path().join("widget.json");
    stdout_of(&reps(&config, &["export", "--output", out_path.to_str().unwrap()]));

    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(payload["goal"], 30);
    assert_eq!(payload["total_count"], 7);
    let week = payload["last_7_days"].as_array().unwrap();
    assert_eq!(week.len(), 7);
    let week_sum: u64 = week.iter().map(|d| d["count"].as_u64().unwrap()).sum();
    assert_eq!(week_sum, 7);
}

/// Test every mutating command rewrites the configured snapshot.
#[test]
fn test_mutations_refresh_configured_snapshot() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let snapshot = temp.path().join("snapshot.json");

    stdout_of(&reps(&config, &["add", "2"]));
    let first: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(first["total_count"], 2);

    stdout_of(&reps(&config, &["add", "3"]));
    let second: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(second["total_count"], 5);
}

/// Test goal set persists to the config file and drives later commands.
#[test]
fn test_goal_set_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let set = stdout_of(&reps(&config, &["goal", "set", "50"]));
    assert!(set.contains("set to 50"), "{set}");

    let show = stdout_of(&reps(&config, &["goal"]));
    assert!(show.contains("Daily goal: 50 reps"), "{show}");

    // The write-back kept the paths that were already configured.
    let table: toml::Table = std::fs::read_to_string(&config)
        .unwrap()
        .parse()
        .unwrap();
    assert!(table.contains_key("database_path"));
    assert_eq!(table["daily_goal"], toml::Value::Integer(50));

    // The new goal drives the progress display.
    let status = stdout_of(&reps(&config, &["status"]));
    assert!(status.contains("/ 50 reps"), "{status}");
}

#[test]
fn test_goal_set_rejects_out_of_bounds() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    for bad in ["0", "201"] {
        let output = reps(&config, &["goal", "set", bad]);
        assert!(!output.status.success(), "goal set {bad} should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("between 1 and 200"), "{stderr}");
    }
}

/// Test seeded history flows through status, report, and export.
#[test]
fn test_seed_status_export_flow() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let seed = stdout_of(&reps(&config, &["seed", "--days", "10"]));
    assert!(seed.contains("Seeded 10 days"), "{seed}");

    // Status renders whatever the seed produced.
    let status = stdout_of(&reps(&config, &["status"]));
    assert!(status.contains("/ 30 reps"), "{status}");

    let report = stdout_of(&reps(&config, &["report", "--json"]));
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    // Ten seeded days of at most goal + 15 reps each.
    let total = report["totals"]["total_count"].as_u64().unwrap();
    assert!(total <= 450, "seeded total out of range: {total}");

    let export = stdout_of(&reps(&config, &["export", "--output", "-"]));
    let payload: serde_json::Value = serde_json::from_str(&export).unwrap();
    assert_eq!(payload["total_count"].as_u64().unwrap(), total);
}

/// Test the calendar renders a month grid with goal markers.
#[test]
fn test_calendar_renders_current_month() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    stdout_of(&reps(&config, &["add", "30"]));

    let calendar = stdout_of(&reps(&config, &["calendar"]));
    assert!(calendar.contains("Su  Mo  Tu  We  Th  Fr  Sa"), "{calendar}");
    assert!(calendar.contains("Goal met on 1 of"), "{calendar}");
}

#[test]
fn test_fresh_store_reports_cleanly() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let report = stdout_of(&reps(&config, &["report"]));
    assert!(report.contains("No reps recorded yet."), "{report}");

    let status = stdout_of(&reps(&config, &["status"]));
    assert!(status.contains("0 / 30 reps"), "{status}");
}
