//! Rep counter CLI library.
//!
//! This crate provides the CLI interface for the rep counter.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, GoalAction};
pub use config::{Config, GOAL_MAX, GOAL_MIN};
