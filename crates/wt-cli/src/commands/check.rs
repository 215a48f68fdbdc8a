//! Connectivity probe: server info, bucket inventory, and a preview of the
//! day's estimated hours. Touches no ledger.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use wt_aw::{AwError, BucketSource, Client, choose_source, sample_source};

use crate::cli::DaySelection;
use crate::{Config, device};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub day: DaySelection,

    /// ActivityWatch server base URL.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &CheckArgs, config: &Config) -> Result<()> {
    let date = args.day.resolve()?;
    let window = date.window();
    let server = args.server.as_deref().unwrap_or(&config.server_url);
    let client = Client::new(server)?;
    let hostname = device::local_hostname();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let (info, bucket_ids) = runtime
        .block_on(async { Ok::<_, AwError>((client.server_info().await?, client.buckets().await?)) })
        .context("could not read ActivityWatch data; make sure the server is running and reachable")?;
    let bucket_ids: Vec<String> = bucket_ids.into_keys().collect();

    writeln!(writer, "Connected to ActivityWatch: {server}")?;
    writeln!(writer, "Host: {hostname}")?;
    writeln!(
        writer,
        "Version: {}",
        info.version.as_deref().unwrap_or("unknown")
    )?;
    writeln!(writer, "Buckets: {}", bucket_ids.len())?;

    let source = choose_source(&bucket_ids, &hostname).ok_or_else(|| AwError::NoBucket {
        hostname: hostname.clone(),
    })?;
    let sample = runtime
        .block_on(sample_source(&client, &source, window))
        .context("could not read ActivityWatch data; make sure the server is running and reachable")?;

    match &source {
        BucketSource::Afk(id) => writeln!(writer, "AFK bucket: {id}")?,
        BucketSource::Window(id) => writeln!(writer, "Window bucket: {id}")?,
    }
    writeln!(writer, "Events on {date}: {}", sample.event_count)?;
    writeln!(
        writer,
        "Estimated active hours: {:.2}h",
        sample.seconds / 3600.0
    )?;
    Ok(())
}
