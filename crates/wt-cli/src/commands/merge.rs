//! Merging device ledgers into the canonical ledger.

use std::io::Write;

use anyhow::Result;

use wt_core::{Ledger, merge_devices};

use crate::{Config, device};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let device_files = device::discover_device_ledgers(&config.data_dir)?;
    if device_files.is_empty() {
        writeln!(
            writer,
            "No device ledgers found ({}). Nothing to merge.",
            config.data_dir.join("worktime.devices.*.json").display()
        )?;
        return Ok(());
    }

    let canonical_path = config.canonical_ledger_path();
    // Merge inputs load leniently: entry-level damage is skipped, only
    // invalid JSON syntax is fatal. That applies to the canonical file too.
    let canonical = Ledger::load_lenient(&canonical_path)?;

    let mut devices = Vec::with_capacity(device_files.len());
    for path in &device_files {
        devices.push(Ledger::load_lenient(path)?);
    }

    let merged = merge_devices(&canonical, &devices);
    merged.save(&canonical_path)?;

    writeln!(
        writer,
        "Merged {} device ledger(s) into {}",
        device_files.len(),
        canonical_path.display()
    )?;
    let names: Vec<&str> = device_files
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .collect();
    writeln!(writer, "Device sources: {}", names.join(", "))?;
    Ok(())
}
