//! Manual hours logging.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use wt_core::{DateKey, Hours, Ledger};

use crate::cli::DaySelection;
use crate::commands::gaps;
use crate::{Config, device, git};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Hours to record for the day.
    #[arg(value_name = "HOURS", allow_negative_numbers = true)]
    pub hours: f64,

    #[command(flatten)]
    pub day: DaySelection,

    /// Write to this device's ledger instead of the canonical one.
    #[arg(long)]
    pub device: Option<String>,

    /// Report calendar dates missing from the ledger afterwards.
    #[arg(long)]
    pub backfill: bool,

    /// Commit the updated ledger with git.
    #[arg(long)]
    pub commit: bool,

    /// Push the commit to origin.
    #[arg(long)]
    pub push: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &LogArgs, config: &Config) -> Result<()> {
    let hours = Hours::new(args.hours).context("hours must be a non-negative number")?;
    let date = args.day.resolve()?;

    let path = match &args.device {
        Some(raw) => {
            let id = device::resolve_device(Some(raw), None)?;
            config.device_ledger_path(&id)
        }
        None => config.canonical_ledger_path(),
    };

    let ledger = record(writer, &path, date, hours)?;

    if args.backfill {
        gaps::report_missing(writer, &ledger, backfill_end(args.day.yesterday)?)?;
    }
    if args.commit {
        git::commit(
            &config.data_dir,
            &path,
            &format!("Log worktime {date}: {hours}h"),
        )?;
    }
    if args.push {
        git::push(&config.data_dir)?;
    }
    Ok(())
}

/// Loads the ledger at `path`, records `hours` for `date`, and saves it.
///
/// Shared with the auto command so both paths write ledgers identically.
pub(crate) fn record<W: Write>(
    writer: &mut W,
    path: &Path,
    date: DateKey,
    hours: Hours,
) -> Result<Ledger> {
    let mut ledger = Ledger::load(path)?;
    ledger.upsert(date, hours);
    ledger.save(path)?;

    writeln!(writer, "Logged {hours}h for {date}.")?;
    writeln!(writer, "Updated: {}", path.display())?;
    Ok(ledger)
}

/// End of the backfill report range: yesterday when logging for yesterday,
/// today otherwise.
pub(crate) fn backfill_end(yesterday: bool) -> Result<DateKey> {
    let today = DateKey::today();
    if yesterday {
        today.offset(-1).context("cannot compute yesterday")
    } else {
        Ok(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn date(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn record_creates_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worktime.json");

        let mut output = Vec::new();
        record(
            &mut output,
            &path,
            date("2024-03-01"),
            Hours::new(7.5).unwrap(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&dir.path().display().to_string(), "[DATA]");
        assert_snapshot!(output, @r"
        Logged 7.5h for 2024-03-01.
        Updated: [DATA]/worktime.json
        ");

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"2024-03-01\": 7.5\n}\n");
    }

    #[test]
    fn record_preserves_other_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worktime.json");
        std::fs::write(&path, "{\n  \"2024-02-28\": 6\n}\n").unwrap();

        let mut output = Vec::new();
        record(
            &mut output,
            &path,
            date("2024-03-01"),
            Hours::new(9.0).unwrap(),
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"2024-02-28\": 6,\n  \"2024-03-01\": 9\n}\n"
        );
    }

    #[test]
    fn record_fails_on_corrupt_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worktime.json");
        std::fs::write(&path, "{oops").unwrap();

        let mut output = Vec::new();
        let result = record(
            &mut output,
            &path,
            date("2024-03-01"),
            Hours::new(1.0).unwrap(),
        );
        assert!(result.is_err());
    }
}
