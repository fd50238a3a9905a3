//! Goal command: show or change the daily repetition goal.
//!
//! `reps goal` prints the goal the configuration resolves to; `reps goal
//! set N` validates the new value and writes it back to the config file,
//! leaving every other key in the file as it was.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{self, Config};

/// Prints the active daily goal.
pub fn show<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let goal = config.goal()?;
    writeln!(writer, "Daily goal: {goal} reps")?;
    Ok(())
}

/// Validates and persists a new daily goal.
///
/// The goal is written to `config_path` when given, otherwise to the
/// default config file, so the next invocation picks it up through the
/// normal configuration layering.
pub fn set<W: Write>(writer: &mut W, reps: u32, config_path: Option<&Path>) -> Result<()> {
    let goal = config::validate_goal(reps)?;

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => {
            config::default_config_file().context("could not determine config directory")?
        }
    };
    write_goal(&path, goal.get())?;
    tracing::info!(goal = goal.get(), path = %path.display(), "daily goal updated");

    writeln!(writer, "Daily goal set to {goal} reps")?;
    writeln!(writer, "Saved to {}", path.display())?;
    Ok(())
}

/// Updates `daily_goal` in the TOML file, creating the file if needed.
fn write_goal(path: &Path, reps: u32) -> Result<()> {
    let mut table = match std::fs::read_to_string(path) {
        Ok(content) => content
            .parse::<toml::Table>()
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    table.insert(
        "daily_goal".to_string(),
        toml::Value::Integer(i64::from(reps)),
    );

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("failed to create config directory")?;
        }
    }
    let content = toml::to_string_pretty(&table).context("failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
