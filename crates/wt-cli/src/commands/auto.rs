//! Automatic hours detection from ActivityWatch.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use wt_core::Hours;

use crate::cli::DaySelection;
use crate::commands::{gaps, log};
use crate::{Config, device, git};

#[derive(Debug, Args)]
pub struct AutoArgs {
    #[command(flatten)]
    pub day: DaySelection,

    /// Device name for the per-device ledger (defaults to the hostname).
    #[arg(long)]
    pub device: Option<String>,

    /// ActivityWatch server base URL.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Detect and report without writing the ledger.
    #[arg(long)]
    pub dry_run: bool,

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

pub fn run<W: Write>(writer: &mut W, args: &AutoArgs, config: &Config) -> Result<()> {
    let date = args.day.resolve()?;
    let window = date.window();

    let device_id = device::resolve_device(args.device.as_deref(), config.device.as_deref())?;
    let path = config.device_ledger_path(&device_id);

    let server = args.server.as_deref().unwrap_or(&config.server_url);
    let client = wt_aw::Client::new(server)?;
    let hostname = device::local_hostname();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let sample = runtime
        .block_on(wt_aw::collect_day(&client, &hostname, window))
        .context("could not read ActivityWatch data; make sure the server is running and reachable")?;

    let raw_hours = sample.seconds / 3600.0;
    let hours = Hours::from_seconds(sample.seconds).context("detected hours are out of range")?;

    writeln!(writer, "ActivityWatch source: {}", sample.source)?;
    writeln!(writer, "Detected {raw_hours:.2}h on {date}; logging {hours}h.")?;
    writeln!(writer, "Device: {device_id} -> {}", path.display())?;

    if args.dry_run {
        writeln!(writer, "Dry run enabled: no data file was modified.")?;
        return Ok(());
    }

    let ledger = log::record(writer, &path, date, hours)?;

    if args.backfill {
        gaps::report_missing(writer, &ledger, log::backfill_end(args.day.yesterday)?)?;
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
