//! CLI subcommand implementations.

pub mod add;
pub mod calendar;
pub mod export;
pub mod goal;
pub mod monitor;
pub mod report;
pub mod seed;
pub mod status;
