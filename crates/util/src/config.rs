//! Dashboard configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file
//! (`~/.config/reana/tui.json` unless `REANA_TUI_CONFIG_PATH` says
//! otherwise), then environment variables. Command-line overrides are applied
//! by the binary, and anything still unset may be filled in from the server's
//! `/api/config` once it has been fetched.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reana_types::ServerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{default_config_file, expand_tilde};

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "REANA_TUI_CONFIG_PATH";
pub const SERVER_URL_ENV: &str = "REANA_SERVER_URL";
pub const ACCESS_TOKEN_ENV: &str = "REANA_ACCESS_TOKEN";
pub const POLLING_SECS_ENV: &str = "REANA_UI_POLLING_SECS";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "tui.json";
pub const DEFAULT_SERVER_URL: &str = "https://localhost:30443";
/// Used when neither local settings nor the server provide an interval.
pub const DEFAULT_POLLING_SECS: u64 = 15;

/// Error surfaced when reading the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An environment variable held a value of the wrong shape.
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// Settings consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server_url: String,
    pub access_token: Option<String>,
    /// Seconds between polling ticks; `Some(0)` disables polling and `None`
    /// defers to the server.
    pub polling_secs: Option<u64>,
    /// Days of inactivity before the server closes an interactive session.
    pub max_interactive_session_inactivity_period: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            access_token: None,
            polling_secs: None,
            max_interactive_session_inactivity_period: None,
        }
    }
}

impl DashboardConfig {
    /// Load defaults, the JSON file, and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path();
        let mut config = load_file(&path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `REANA_SERVER_URL`, `REANA_ACCESS_TOKEN`, and
    /// `REANA_UI_POLLING_SECS` when set and non-empty.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = non_empty_env(SERVER_URL_ENV) {
            self.server_url = url;
        }
        if let Some(token) = non_empty_env(ACCESS_TOKEN_ENV) {
            self.access_token = Some(token);
        }
        if let Some(raw) = non_empty_env(POLLING_SECS_ENV) {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                name: POLLING_SECS_ENV,
                value: raw.clone(),
            })?;
            self.polling_secs = Some(secs);
        }
        Ok(())
    }

    /// Fill fields the user did not set locally from the server's settings.
    pub fn merge_server_config(&mut self, server: &ServerConfig) {
        if self.polling_secs.is_none() {
            self.polling_secs = server.polling_secs;
        }
        if self.max_interactive_session_inactivity_period.is_none() {
            self.max_interactive_session_inactivity_period = server.max_interactive_session_inactivity_period;
        }
    }

    /// Effective polling interval. `None` means polling is disabled.
    pub fn polling_interval(&self) -> Option<Duration> {
        match self.polling_secs.unwrap_or(DEFAULT_POLLING_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Effective polling seconds, 0 when disabled.
    pub fn effective_polling_secs(&self) -> u64 {
        self.polling_interval().map(|interval| interval.as_secs()).unwrap_or(0)
    }
}

/// Resolve the config file path, honoring `REANA_TUI_CONFIG_PATH`.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }
    default_config_file(CONFIG_FILE_NAME)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_file(path: &Path) -> Result<DashboardConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(DashboardConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(DashboardConfig::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ALL_VARS: [&str; 4] = [CONFIG_PATH_ENV, SERVER_URL_ENV, ACCESS_TOKEN_ENV, POLLING_SECS_ENV];

    fn without_env<R>(f: impl FnOnce() -> R) -> R {
        let unset: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|name| (*name, None)).collect();
        temp_env::with_vars(unset, f)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_file(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tui.json");
        fs::write(&path, "{ not json").expect("write");
        let config = load_file(&path).expect("load");
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn file_then_env_layering() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tui.json");
        let mut file = fs::File::create(&path).expect("create");
        write!(file, r#"{{"server_url": "https://reana.example.org", "polling_secs": 30}}"#).expect("write");

        let path_str = path.to_string_lossy().to_string();
        without_env(|| {
            temp_env::with_vars(
                [(CONFIG_PATH_ENV, Some(path_str.as_str())), (ACCESS_TOKEN_ENV, Some("tok"))],
                || {
                    let config = DashboardConfig::load().expect("load");
                    assert_eq!(config.server_url, "https://reana.example.org");
                    assert_eq!(config.polling_secs, Some(30));
                    assert_eq!(config.access_token.as_deref(), Some("tok"));
                },
            )
        });
    }

    #[test]
    fn invalid_polling_env_is_rejected() {
        without_env(|| {
            temp_env::with_var(POLLING_SECS_ENV, Some("soon"), || {
                let mut config = DashboardConfig::default();
                let error = config.apply_env().expect_err("should reject");
                assert!(matches!(error, ConfigError::InvalidEnv { name: POLLING_SECS_ENV, .. }));
            })
        });
    }

    #[test]
    fn server_values_only_fill_unset_fields() {
        let server = ServerConfig {
            polling_secs: Some(60),
            max_interactive_session_inactivity_period: Some(7),
        };
        let mut config = DashboardConfig {
            polling_secs: Some(5),
            ..DashboardConfig::default()
        };
        config.merge_server_config(&server);
        assert_eq!(config.polling_secs, Some(5));
        assert_eq!(config.max_interactive_session_inactivity_period, Some(7));
    }

    #[test]
    fn zero_polling_disables_interval() {
        let disabled = DashboardConfig {
            polling_secs: Some(0),
            ..DashboardConfig::default()
        };
        assert_eq!(disabled.polling_interval(), None);
        assert_eq!(disabled.effective_polling_secs(), 0);

        let unset = DashboardConfig::default();
        assert_eq!(unset.polling_interval(), Some(Duration::from_secs(DEFAULT_POLLING_SECS)));
    }
}
