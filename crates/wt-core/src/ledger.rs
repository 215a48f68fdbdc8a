//! The worktime ledger: an ordered date → hours mapping persisted as JSON.
//!
//! The on-disk form is a pretty-printed object with ascending keys and a
//! trailing newline, so ledgers diff cleanly under version control.
//! Concurrent writers to the same path are not coordinated; the last save
//! wins.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::date::DateKey;

/// Ledger load/save errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The file exists but could not be read.
    #[error("failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file's contents are not a valid date → hours mapping.
    ///
    /// Never partially recovered: a corrupt ledger is fatal to the caller.
    #[error("corrupt ledger {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    /// The ledger could not be written.
    #[error("failed to write ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A day's worked hours: finite, non-negative, rounded to the nearest tenth.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Hours(f64);

impl Hours {
    /// Validates and rounds a raw value. `None` for negative, NaN, or
    /// infinite input.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then(|| Self((value * 10.0).round() / 10.0))
    }

    /// Converts raw seconds to rounded hours.
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        Self::new(seconds / 3600.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // f64 Display drops the trailing ".0", matching the file format.
        write!(f, "{}", self.0)
    }
}

impl Serialize for Hours {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "integral by the fract() check, non-negative by construction, in u64 range by the bound"
    )]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole values serialize as integers so files stay diff-friendly
        // ("9" rather than "9.0"). The bound keeps the u64 cast exact;
        // anything larger falls through to the float form.
        if self.0.fract() == 0.0 && self.0 <= f64::from(u32::MAX) {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid hours value {value}: must be >= 0"))
        })
    }
}

/// An ordered date → hours ledger.
///
/// Either device-scoped (written by one device's logging runs) or canonical
/// (recomputed by the merge step).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: BTreeMap<DateKey, Hours>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a ledger, strictly.
    ///
    /// A missing or blank file is an empty ledger. Anything that does not
    /// parse as a complete date → hours object is [`LedgerError::Corrupt`].
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let Some(contents) = read_contents(path)? else {
            return Ok(Self::new());
        };
        let entries: BTreeMap<DateKey, Hours> =
            serde_json::from_str(&contents).map_err(|err| LedgerError::Corrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Loads a ledger, skipping malformed entries.
    ///
    /// Used for merge inputs (device files and the canonical file alike): a
    /// file with invalid JSON syntax is still fatal, but individual entries
    /// with bad keys or bad values are dropped with a warning rather than
    /// poisoning the whole merge.
    pub fn load_lenient(path: &Path) -> Result<Self, LedgerError> {
        let Some(contents) = read_contents(path)? else {
            return Ok(Self::new());
        };
        let raw: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&contents).map_err(|err| LedgerError::Corrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let Ok(date) = key.parse::<DateKey>() else {
                tracing::warn!(path = %path.display(), key = %key, "skipping entry with invalid date key");
                continue;
            };
            let Some(hours) = value.as_f64().and_then(Hours::new) else {
                tracing::warn!(path = %path.display(), key = %key, value = %value, "skipping entry with invalid hours");
                continue;
            };
            entries.insert(date, hours);
        }
        Ok(Self { entries })
    }

    /// Sets or overwrites the entry for `date`. Last write wins.
    pub fn upsert(&mut self, date: DateKey, hours: Hours) {
        self.entries.insert(date, hours);
    }

    /// Writes the ledger as pretty JSON with ascending keys and a trailing
    /// newline, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(path, e))?;
        }
        let mut json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_err(path, io::Error::other(e)))?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| write_err(path, e))
    }

    pub fn get(&self, date: DateKey) -> Option<Hours> {
        self.entries.get(&date).copied()
    }

    pub fn contains(&self, date: DateKey) -> bool {
        self.entries.contains_key(&date)
    }

    /// The earliest recorded date, if any.
    pub fn first_date(&self) -> Option<DateKey> {
        self.entries.keys().next().copied()
    }

    /// Entries in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (DateKey, Hours)> + '_ {
        self.entries.iter().map(|(date, hours)| (*date, *hours))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(DateKey, Hours)> for Ledger {
    fn from_iter<T: IntoIterator<Item = (DateKey, Hours)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn write_err(path: &Path, source: io::Error) -> LedgerError {
    LedgerError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads a ledger file, mapping "missing" and "blank" to `None`.
fn read_contents(path: &Path) -> Result<Option<String>, LedgerError> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(None),
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LedgerError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
