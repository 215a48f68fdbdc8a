//! Command-line argument definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use wt_core::DateKey;

use crate::commands::{auto, check, gaps, log};

/// ActivityWatch-backed worktime logger.
///
/// Estimates daily active hours from an ActivityWatch server and keeps a
/// per-day hours ledger that merges cleanly across devices.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record hours for a day by hand.
    Log(log::LogArgs),

    /// Detect hours from ActivityWatch and record them for this device.
    Auto(auto::AutoArgs),

    /// Merge device ledgers into the canonical ledger.
    Merge,

    /// List calendar dates missing from the ledger.
    Gaps(gaps::GapsArgs),

    /// Probe the ActivityWatch server and preview a day's hours.
    Check(check::CheckArgs),
}

/// Selects the day a command operates on. Defaults to today.
#[derive(Debug, Args)]
pub struct DaySelection {
    /// Target date.
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "yesterday")]
    pub date: Option<DateKey>,

    /// Use yesterday's date.
    #[arg(long)]
    pub yesterday: bool,
}

impl DaySelection {
    /// The selected date: `--date`, else yesterday/today.
    pub fn resolve(&self) -> Result<DateKey> {
        if let Some(date) = self.date {
            return Ok(date);
        }
        let today = DateKey::today();
        if self.yesterday {
            today.offset(-1).context("cannot compute yesterday")
        } else {
            Ok(today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_date_wins() {
        let selection = DaySelection {
            date: Some("2024-01-15".parse().unwrap()),
            yesterday: false,
        };
        assert_eq!(selection.resolve().unwrap().to_string(), "2024-01-15");
    }

    #[test]
    fn yesterday_is_one_day_before_today() {
        let selection = DaySelection {
            date: None,
            yesterday: true,
        };
        let resolved = selection.resolve().unwrap();
        assert_eq!(resolved.offset(1).unwrap(), DateKey::today());
    }

    #[test]
    fn default_is_today() {
        let selection = DaySelection {
            date: None,
            yesterday: false,
        };
        assert_eq!(selection.resolve().unwrap(), DateKey::today());
    }
}
