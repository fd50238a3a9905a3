use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reps_cli::commands::{add, calendar, export, goal, monitor, report, seed, status};
use reps_cli::{Cli, Commands, Config, GoalAction};
use reps_core::DayBucketer;
use reps_core::stats::DEFAULT_AVERAGE_WINDOW_DAYS;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(reps_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = reps_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // One frozen offset per invocation: every day key this run computes
    // comes from the same bucketer, even across a DST step.
    let bucketer = DayBucketer::local();
    let now = Utc::now();
    let today = bucketer.day_of(now);
    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Add { count }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let goal = config.goal()?;
            let delta = i32::try_from(*count).context("count too large")?;
            add::run(&mut stdout, &mut db, goal, delta, today, now)?;
            export::refresh(&db, &config.snapshot_path, goal, today)?;
        }
        Some(Commands::Sub { count }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let goal = config.goal()?;
            let delta = i32::try_from(*count).context("count too large")?;
            add::run(&mut stdout, &mut db, goal, -delta, today, now)?;
            export::refresh(&db, &config.snapshot_path, goal, today)?;
        }
        Some(Commands::Monitor { input }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            monitor::run(&mut stdout, &mut db, &config, bucketer, input.as_deref())?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, config.goal()?, today)?;
        }
        Some(Commands::Report { window, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let window_days = window.unwrap_or(DEFAULT_AVERAGE_WINDOW_DAYS);
            report::run(&db, config.goal()?, today, window_days, *json)?;
        }
        Some(Commands::Calendar { month }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            calendar::run(&mut stdout, &db, config.goal()?, today, month.as_deref())?;
        }
        Some(Commands::Export { output }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            export::run(
                &mut stdout,
                &db,
                &config.snapshot_path,
                config.goal()?,
                today,
                output.as_deref(),
            )?;
        }
        Some(Commands::Goal { action }) => match action {
            Some(GoalAction::Set { reps }) => {
                goal::set(&mut stdout, *reps, cli.config.as_deref())?;
            }
            None => {
                let config = Config::load_from(cli.config.as_deref())
                    .context("failed to load configuration")?;
                goal::show(&mut stdout, &config)?;
            }
        },
        Some(Commands::Seed { days }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let goal = config.goal()?;
            let mut rng = rand::thread_rng();
            seed::run(&mut stdout, &mut db, &mut rng, goal, *days, today, now)?;
            export::refresh(&db, &config.snapshot_path, goal, today)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
