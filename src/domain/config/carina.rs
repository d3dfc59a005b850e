// Copyright 2025 The Carina Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Carina CLI configuration file

use crate::domain::cluster::WaitPolicy;
use crate::infrastructure::constants::{
    BETA_ENDPOINT, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, ENV_API_KEY, ENV_USERNAME,
    POLL_INTERVAL, STARTUP_GRACE_PERIOD,
};
use crate::shared::error::{CarinaError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Config file
// ============================================================================

/// Contents of `~/.carina/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CarinaConf {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub wait: WaitConf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WaitConf {
    pub grace_period_secs: u64,
    pub poll_interval_secs: u64,
    pub timeout_secs: Option<u64>,
}

impl Default for WaitConf {
    fn default() -> Self {
        Self {
            grace_period_secs: STARTUP_GRACE_PERIOD.as_secs(),
            poll_interval_secs: POLL_INTERVAL.as_secs(),
            timeout_secs: None,
        }
    }
}

impl WaitConf {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            grace_period: Duration::from_secs(self.grace_period_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl CarinaConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            CarinaError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content).map_err(|e| {
            CarinaError::config_error(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        conf.validate()?;
        Ok(conf)
    }

    /// Load the explicit config file, or the default one when it exists.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("Loading config from {}", path.display());
                Self::from(path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.wait.poll_interval_secs == 0 {
            return Err(CarinaError::config_error(
                "wait.poll_interval_secs must be > 0",
            ));
        }
        if self.wait.timeout_secs == Some(0) {
            return Err(CarinaError::config_error("wait.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| {
            PathBuf::from(home)
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILE)
        })
}

// ============================================================================
// Connection settings
// ============================================================================

/// Everything needed to authenticate against the Carina API
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub username: String,
    pub api_key: String,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ConnectionSettings {
    /// Priority: command line (or environment) > config file > defaults
    pub fn resolve(
        username: Option<String>,
        api_key: Option<String>,
        endpoint: Option<String>,
        conf: &CarinaConf,
    ) -> Result<Self> {
        let username = non_empty(username)
            .or_else(|| non_empty(conf.username.clone()))
            .ok_or_else(|| {
                CarinaError::Authentication(format!(
                    "username is required (use --username or set {})",
                    ENV_USERNAME
                ))
            })?;

        let api_key = non_empty(api_key)
            .or_else(|| non_empty(conf.api_key.clone()))
            .ok_or_else(|| {
                CarinaError::Authentication(format!(
                    "API key is required (use --api-key or set {})",
                    ENV_API_KEY
                ))
            })?;

        let endpoint = non_empty(endpoint)
            .or_else(|| non_empty(conf.endpoint.clone()))
            .unwrap_or_else(|| BETA_ENDPOINT.to_string());

        Ok(Self {
            endpoint,
            username,
            api_key,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
