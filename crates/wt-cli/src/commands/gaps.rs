//! Gap reports: calendar dates missing from a ledger.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use wt_core::{DateKey, Ledger, find_gaps};

use crate::{Config, device};

#[derive(Debug, Args)]
pub struct GapsArgs {
    /// Start of the range (defaults to the first ledger date).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<DateKey>,

    /// End of the range (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<DateKey>,

    /// Inspect this device's ledger instead of the canonical one.
    #[arg(long)]
    pub device: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &GapsArgs, config: &Config) -> Result<()> {
    let path = match &args.device {
        Some(raw) => {
            let id = device::resolve_device(Some(raw), None)?;
            config.device_ledger_path(&id)
        }
        None => config.canonical_ledger_path(),
    };
    let ledger = Ledger::load(&path)?;

    let Some(start) = args.from.or_else(|| ledger.first_date()) else {
        writeln!(
            writer,
            "Ledger {} is empty; nothing to check.",
            path.display()
        )?;
        return Ok(());
    };
    let end = args.to.unwrap_or_else(DateKey::today);

    print_missing(writer, &find_gaps(&ledger, start, end))
}

/// Backfill report used by the log and auto commands: from the first ledger
/// date through `end`.
pub(crate) fn report_missing<W: Write>(writer: &mut W, ledger: &Ledger, end: DateKey) -> Result<()> {
    let Some(start) = ledger.first_date() else {
        writeln!(writer, "No data yet to backfill.")?;
        return Ok(());
    };
    print_missing(writer, &find_gaps(ledger, start, end))
}

fn print_missing<W: Write>(writer: &mut W, missing: &[DateKey]) -> Result<()> {
    if missing.is_empty() {
        writeln!(writer, "No missing dates.")?;
    } else {
        let rendered = missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "Missing dates ({}): {rendered}", missing.len())?;
    }
    Ok(())
}
