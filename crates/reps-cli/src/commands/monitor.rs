//! Monitor command: a detection session over a tilt-sample stream.
//!
//! Samples arrive as JSON lines on stdin or from a file, in timestamp
//! order. Each completed repetition is committed to the store (and the
//! snapshot refreshed) as it happens, so an interrupted session keeps
//! everything counted so far. The session ends when the input does; the
//! loop drains fully before the summary is printed.
//!
//! A session holds an exclusive lock next to the database so two
//! monitors cannot interleave their debounce windows.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use fs2::FileExt;
use uuid::Uuid;

use reps_core::{DayBucketer, Goal, RepDetector, RepEventKind, TiltSample};
use reps_db::Database;

use crate::Config;
use crate::commands::export;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    bucketer: DayBucketer,
    input: Option<&Path>,
) -> Result<()> {
    let goal = config.goal()?;
    let detector_config = config.detector_config()?;
    let mut detector = RepDetector::new(detector_config)?;

    let _session_lock = acquire_session_lock(&config.database_path)?;

    let session_id = Uuid::new_v4();
    tracing::info!(%session_id, input = ?input, "monitor session started");

    let skipped = match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            run_session(BufReader::new(file), &mut detector, db, config, bucketer, goal)?
        }
        None => {
            let stdin = io::stdin();
            run_session(stdin.lock(), &mut detector, db, config, bucketer, goal)?
        }
    };

    let tally = detector.tally();
    tracing::info!(
        %session_id,
        samples = tally.samples,
        completed = tally.completed,
        "monitor session finished"
    );

    writeln!(
        writer,
        "Session complete: {} reps from {} samples",
        tally.completed, tally.samples
    )?;
    if tally.rejected_too_fast > 0 {
        writeln!(writer, "  {} too fast to count", tally.rejected_too_fast)?;
    }
    if tally.rejected_invalid > 0 {
        writeln!(writer, "  {} invalid samples", tally.rejected_invalid)?;
    }
    if skipped > 0 {
        writeln!(writer, "  {skipped} unreadable lines skipped")?;
    }

    let today = bucketer.day_of(Utc::now());
    let today_count = db.count_on(today)?;
    writeln!(writer, "Today: {today_count} / {goal} reps")?;

    Ok(())
}

fn acquire_session_lock(database_path: &Path) -> Result<File> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }
    let lock_file = File::create(session_lock_path(database_path))
        .context("failed to create session lock file")?;
    lock_file
        .lock_exclusive()
        .context("failed to acquire session lock")?;
    Ok(lock_file)
}

fn session_lock_path(database_path: &Path) -> PathBuf {
    database_path.with_extension("monitor.lock")
}

/// Feeds one line-delimited sample stream through the detector.
///
/// Unreadable lines are skipped with a warning rather than aborting the
/// session; everything the detector rejects is tallied by the detector
/// itself. Returns the number of skipped lines.
fn run_session<R: BufRead>(
    reader: R,
    detector: &mut RepDetector,
    db: &mut Database,
    config: &Config,
    bucketer: DayBucketer,
    goal: Goal,
) -> Result<u32> {
    let mut skipped = 0u32;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let sample: TiltSample = match serde_json::from_str(trimmed) {
            Ok(sample) => sample,
            Err(e) => {
                skipped += 1;
                tracing::warn!(line = idx + 1, error = %e, "skipping unreadable sample");
                continue;
            }
        };

        let Some(event) = detector.process(sample) else {
            continue;
        };
        if event.kind == RepEventKind::Completed {
            // Reps land on the day of the movement, not the day of the
            // commit; streaks always walk back from the current day.
            let now = Utc::now();
            let day = bucketer.day_of(event.timestamp);
            let today = bucketer.day_of(now);
            let change = db.record_completion(day, 1, goal, today, now)?;
            tracing::debug!(%day, count = change.new, "rep committed");
            export::refresh(db, &config.snapshot_path, goal, today)?;
        }
    }
    Ok(skipped)
}
