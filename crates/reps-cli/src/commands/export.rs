//! Export command and snapshot refresh.
//!
//! The snapshot is a JSON file read by external display surfaces, so it
//! is rewritten after every count mutation, not just on `reps export`.
//! Writes go to a temp file in the same directory followed by a rename,
//! under a sidecar lock, so a reader never sees a half-written payload.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use fs2::FileExt;

use reps_core::{ExportPayload, Goal};
use reps_db::Database;

/// Runs the export command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    snapshot_path: &Path,
    goal: Goal,
    today: NaiveDate,
    output: Option<&Path>,
) -> Result<()> {
    let payload = build_payload(db, goal, today)?;

    match output {
        Some(path) if path.as_os_str() == "-" => {
            let content = serde_json::to_string_pretty(&payload)
                .context("failed to serialize snapshot")?;
            writeln!(writer, "{content}")?;
        }
        Some(path) => {
            write_snapshot(path, &payload)?;
            writeln!(writer, "Snapshot written to {}", path.display())?;
        }
        None => {
            write_snapshot(snapshot_path, &payload)?;
            writeln!(writer, "Snapshot written to {}", snapshot_path.display())?;
        }
    }

    Ok(())
}

/// Rebuilds the snapshot file from the store.
///
/// Called by every mutating command after its transaction commits.
pub fn refresh(db: &Database, snapshot_path: &Path, goal: Goal, today: NaiveDate) -> Result<()> {
    let payload = build_payload(db, goal, today)?;
    write_snapshot(snapshot_path, &payload)
}

fn build_payload(db: &Database, goal: Goal, today: NaiveDate) -> Result<ExportPayload> {
    let records = db.range(today - Duration::days(6), today + Duration::days(1))?;
    let stats = db.stats()?;
    Ok(ExportPayload::snapshot(today, &records, &stats, goal))
}

fn lock_path(path: &Path) -> PathBuf {
    path.with_extension("lock")
}

/// Writes the payload atomically: temp file, then rename over the target.
fn write_snapshot(path: &Path, payload: &ExportPayload) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create snapshot directory {}", parent.display())
            })?;
        }
    }

    let lock_file =
        File::create(lock_path(path)).context("failed to create snapshot lock file")?;
    lock_file
        .lock_exclusive()
        .context("failed to acquire snapshot lock")?;

    let mut content =
        serde_json::to_string_pretty(payload).context("failed to serialize snapshot")?;
    content.push('\n');

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        // Clean up the temp file before surfacing the error
        let _ = fs::remove_file(&tmp_path);
        return Err(e)
            .with_context(|| format!("failed to replace {}", path.display()));
    }

    tracing::debug!(path = %path.display(), "snapshot refreshed");
    Ok(())
}
