//! Worktime CLI library.
//!
//! This crate provides the `wt` command-line interface over the ledger and
//! ActivityWatch integration crates.

mod cli;
pub mod commands;
mod config;
pub mod device;
mod git;

pub use cli::{Cli, Commands, DaySelection};
pub use config::Config;
