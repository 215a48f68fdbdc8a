//! Device identity for per-device ledgers.
//!
//! Each machine writes its own ledger file named by a normalized device id,
//! so independent devices never contend for the canonical ledger.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const DEVICE_FILE_PREFIX: &str = "worktime.devices.";
const DEVICE_FILE_SUFFIX: &str = ".json";

/// Normalizes a raw device name to `[a-z0-9._-]`.
///
/// Lowercases, collapses runs of other characters to a single `-`, and
/// strips leading/trailing `-`. `None` if nothing remains.
pub fn normalize_device(raw: &str) -> Option<String> {
    let mut normalized = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | '_' | '-') {
            normalized.push(ch);
            in_run = false;
        } else if !in_run {
            normalized.push('-');
            in_run = true;
        }
    }
    let trimmed = normalized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolves the device id: `--device` flag, then config, then hostname.
pub fn resolve_device(flag: Option<&str>, configured: Option<&str>) -> Result<String> {
    let raw = flag
        .or(configured)
        .map_or_else(local_hostname, str::to_string);
    normalize_device(&raw).with_context(|| {
        format!("invalid device name {raw:?}: use letters, numbers, dot, dash, underscore")
    })
}

/// This machine's hostname, or `"unknown"` when it cannot be determined.
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Lists device ledger files (`worktime.devices.<id>.json`) in `data_dir`,
/// sorted by file name. A missing data dir yields an empty list.
pub fn discover_device_ledgers(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", data_dir.display()));
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list files in {}", data_dir.display()))?;
        let name = entry.file_name();
        if name.to_str().is_some_and(is_device_ledger_name) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_device_ledger_name(name: &str) -> bool {
    name.strip_prefix(DEVICE_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(DEVICE_FILE_SUFFIX))
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_device("  MacMini  "), Some("macmini".to_string()));
    }

    #[test]
    fn normalize_collapses_invalid_runs() {
        assert_eq!(normalize_device("My Mac (work)"), Some("my-mac-work".to_string()));
    }

    #[test]
    fn normalize_keeps_allowed_punctuation() {
        assert_eq!(
            normalize_device("host.example_01-a"),
            Some("host.example_01-a".to_string())
        );
    }

    #[test]
    fn normalize_strips_edge_dashes() {
        assert_eq!(normalize_device("--dev--"), Some("dev".to_string()));
        assert_eq!(normalize_device("!!box!!"), Some("box".to_string()));
    }

    #[test]
    fn normalize_rejects_empty_results() {
        assert_eq!(normalize_device(""), None);
        assert_eq!(normalize_device("!!!"), None);
        assert_eq!(normalize_device("---"), None);
    }

    #[test]
    fn resolve_prefers_flag_over_config() {
        let device = resolve_device(Some("Laptop"), Some("desktop")).unwrap();
        assert_eq!(device, "laptop");
    }

    #[test]
    fn resolve_falls_back_to_config() {
        let device = resolve_device(None, Some("desktop")).unwrap();
        assert_eq!(device, "desktop");
    }

    #[test]
    fn resolve_rejects_unusable_names() {
        assert!(resolve_device(Some("???"), None).is_err());
    }

    #[test]
    fn discover_finds_only_device_ledgers() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "worktime.json",
            "worktime.devices.laptop.json",
            "worktime.devices.desktop.json",
            "worktime.devices..json",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let files = discover_device_ledgers(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "worktime.devices.desktop.json",
                "worktime.devices.laptop.json"
            ]
        );
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(discover_device_ledgers(&missing).unwrap().is_empty());
    }
}
