//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Default ActivityWatch server address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5600";

const CANONICAL_LEDGER_FILE: &str = "worktime.json";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the worktime ledgers.
    pub data_dir: PathBuf,
    /// Base URL of the ActivityWatch server.
    pub server_url: String,
    /// Overrides the device name derived from the hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir,
            server_url: DEFAULT_SERVER_URL.to_string(),
            device: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Precedence, lowest first: defaults, `config.toml` in the platform
    /// config dir, the `--config` file, `WORKTIME_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("WORKTIME_"));

        figment.extract()
    }

    /// Path of the canonical ledger.
    pub fn canonical_ledger_path(&self) -> PathBuf {
        self.data_dir.join(CANONICAL_LEDGER_FILE)
    }

    /// Path of the ledger for a normalized device id.
    pub fn device_ledger_path(&self, device: &str) -> PathBuf {
        self.data_dir.join(format!("worktime.devices.{device}.json"))
    }
}

/// Returns the platform-specific config directory for worktime.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("worktime"))
}

/// Returns the platform-specific data directory for worktime.
///
/// On Linux: `~/.local/share/worktime`
fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("worktime"))
}
