// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Relay configuration.
//!
//! Values are resolved per key in this order:
//! 1. the TOML file (`edp-relay.toml` in the working directory, or `--config`)
//! 2. the matching environment variable
//! 3. the built-in default
//!
//! Nested tables are addressed with dotted keys, so
//!
//! ```toml
//! [api]
//! url = "https://units.example.org/api"
//! ```
//!
//! is read as `api.url`. Empty values fall through to the next layer.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::env::{self, names};
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "edp-relay.toml";

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_DB_PATH: &str = "edp.db";

/// Returns the configuration file path used when none is given.
///
/// `WORK_DIR` overrides the current directory as its location.
pub fn default_path() -> PathBuf {
    env::work_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
        .join(CONFIG_FILE_NAME)
}

/// Layered key lookup over a configuration file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    file: BTreeMap<String, String>,
    env: HashMap<String, String>,
}

impl ConfigProvider {
    /// Load the file at `path` on top of the current process environment.
    ///
    /// A missing file is not an error; the environment and defaults apply.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!("loaded configuration from {}", path.display());
                content
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "no configuration file at {}; using environment variables or defaults",
                    path.display()
                );
                String::new()
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        Self::from_toml_str(&content, env::snapshot())
    }

    /// Build a provider from TOML text and an explicit environment.
    pub fn from_toml_str(
        content: &str,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
        let mut file = BTreeMap::new();
        flatten("", &table, &mut file);
        Ok(ConfigProvider {
            file,
            env: env.into_iter().collect(),
        })
    }

    /// Look up `key` in the file, then `env_key` in the environment, then
    /// fall back to `default`.
    pub fn get(&self, key: &str, env_key: &str, default: Option<&str>) -> Option<String> {
        self.file
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| self.env.get(env_key).filter(|v| !v.is_empty()))
            .cloned()
            .or_else(|| default.map(str::to_string))
    }

    /// Look up a boolean; only `true` (any case) is true.
    pub fn get_bool(&self, key: &str, env_key: &str, default: bool) -> bool {
        self.get(key, env_key, None)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    /// Look up and parse a value, reporting the key on parse failure.
    pub fn get_parsed<T: FromStr>(&self, key: &str, env_key: &str) -> Result<Option<T>> {
        match self.get(key, env_key, None) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::Config(format!("invalid value '{raw}' for {key}"))),
        }
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten(&key, inner, out),
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
}

/// Connection settings for the remote unit API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upper bound for every remote call.
    pub timeout: Duration,
}

/// Fully resolved relay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Without the API there is nothing to relay to.
    pub api_enabled: bool,
    pub api: ApiConfig,
    pub db_path: PathBuf,
    /// Create and update remote units from local state at startup.
    pub upload_units: bool,
    /// Run the relay loop after startup.
    pub relay_enabled: bool,
    pub relay_interval: Duration,
    /// Failed attempts before an outbox row is quarantined; `None` retries forever.
    pub max_attempts: Option<u32>,
    pub startup_retry: Duration,
}

impl Config {
    /// Resolve every setting from `provider`.
    pub fn from_provider(provider: &ConfigProvider) -> Result<Self> {
        let secs = |key: &str, env_key: &str, default: u64| -> Result<Duration> {
            let value = provider.get_parsed::<u64>(key, env_key)?.unwrap_or(default);
            if value == 0 {
                return Err(Error::Config(format!("{key} must be at least 1 second")));
            }
            Ok(Duration::from_secs(value))
        };

        let api = ApiConfig {
            url: provider
                .get("api.url", names::API_URL, Some(DEFAULT_API_URL))
                .unwrap_or_default(),
            token: provider.get("api.token", names::API_TOKEN, None),
            username: provider.get("api.username", names::API_USERNAME, None),
            password: provider.get("api.password", names::API_PASSWORD, None),
            timeout: secs("api.timeout_secs", names::API_TIMEOUT_SECS, 10)?,
        };

        Ok(Config {
            api_enabled: provider.get_bool("api.enabled", names::API_ENABLED, true),
            api,
            db_path: provider
                .get("db.path", names::DB_PATH, Some(DEFAULT_DB_PATH))
                .map(PathBuf::from)
                .unwrap_or_default(),
            upload_units: provider.get_bool("db.units.upload", names::API_SYNC_UNITS, true),
            relay_enabled: provider.get_bool(
                "db.liveconnection.enabled",
                names::DB_LIVECONNECTION_ENABLED,
                true,
            ),
            relay_interval: secs("relay.interval_secs", names::RELAY_INTERVAL_SECS, 3)?,
            // 0 disables quarantining
            max_attempts: provider
                .get_parsed::<u32>("relay.max_attempts", names::RELAY_MAX_ATTEMPTS)?
                .filter(|n| *n > 0),
            startup_retry: secs("startup.retry_secs", names::STARTUP_RETRY_SECS, 60)?,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
