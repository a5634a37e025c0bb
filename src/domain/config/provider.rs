// Copyright 2025 JiangLong.
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

//! Provider configuration: API endpoint, credentials, timeouts and waiter tuning.

use crate::infrastructure::constants::*;
use crate::shared::error::{Result, ShootError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::read_to_string;
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub host: String,
    pub username: String,
    pub token: Option<String>,
    /// Exchanged for a token when no token is configured.
    pub password: Option<String>,
    pub request_timeout_secs: u64,
    pub timeouts: TimeoutConfig,
    pub waiter: WaiterConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            username: String::new(),
            token: None,
            password: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            timeouts: TimeoutConfig::default(),
            waiter: WaiterConfig::default(),
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("timeouts", &self.timeouts)
            .field("waiter", &self.waiter)
            .finish()
    }
}

impl ProviderConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            ShootError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        Ok(conf)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut conf = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        conf.apply_env(|key| std::env::var(key).ok());
        Ok(conf)
    }

    /// Overlay values found through `lookup`; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_API_HOST) {
            self.host = host;
        }
        if let Some(username) = get(ENV_API_USERNAME) {
            self.username = username;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.token = Some(token);
        }
        if let Some(password) = get(ENV_API_PASSWORD) {
            self.password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ShootError::config_error(format!(
                "host is required (set it in the config file or {})",
                ENV_API_HOST
            )));
        }
        url::Url::parse(&self.host)
            .map_err(|e| ShootError::config_error(format!("Invalid host '{}': {}", self.host, e)))?;

        if self.username.trim().is_empty() {
            return Err(ShootError::config_error(format!(
                "username is required (set it in the config file or {})",
                ENV_API_USERNAME
            )));
        }

        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !has(&self.token) && !has(&self.password) {
            return Err(ShootError::config_error(format!(
                "either a token ({}) or a password ({}) is required",
                ENV_API_TOKEN, ENV_API_PASSWORD
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ShootError::config_error(
                "request_timeout_secs must be > 0",
            ));
        }

        self.waiter.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Per-lifecycle time budgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub create_secs: u64,
    pub update_secs: u64,
    pub delete_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            create_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            update_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            delete_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl TimeoutConfig {
    pub fn create(&self) -> Duration {
        Duration::from_secs(self.create_secs)
    }

    pub fn update(&self) -> Duration {
        Duration::from_secs(self.update_secs)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }
}

/// Backoff tuning for the operation waiters.
///
/// Once the projected next poll crosses the condition's threshold, polling
/// switches to a fixed `tightened_interval_secs` without jitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaiterConfig {
    pub initial_interval_secs: u64,
    pub max_interval_secs: u64,
    pub multiplier: f32,
    pub jitter: bool,
    pub tightened_interval_secs: u64,
    pub ready_threshold_secs: u64,
    pub reconcile_threshold_secs: u64,
    pub delete_threshold_secs: u64,
    /// Subtracted from every operation timeout to leave room for bookkeeping.
    pub deadline_headroom_secs: u64,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            initial_interval_secs: DEFAULT_INITIAL_INTERVAL_SECS,
            max_interval_secs: DEFAULT_MAX_INTERVAL_SECS,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: true,
            tightened_interval_secs: DEFAULT_TIGHTENED_INTERVAL_SECS,
            ready_threshold_secs: DEFAULT_READY_THRESHOLD_SECS,
            reconcile_threshold_secs: DEFAULT_RECONCILE_THRESHOLD_SECS,
            delete_threshold_secs: DEFAULT_DELETE_THRESHOLD_SECS,
            deadline_headroom_secs: DEFAULT_DEADLINE_HEADROOM_SECS,
        }
    }
}

impl WaiterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval_secs == 0
            || self.max_interval_secs == 0
            || self.tightened_interval_secs == 0
        {
            return Err(ShootError::config_error(
                "waiter intervals must be > 0",
            ));
        }
        if self.initial_interval_secs > self.max_interval_secs {
            return Err(ShootError::config_error(format!(
                "waiter.initial_interval_secs ({}) exceeds waiter.max_interval_secs ({})",
                self.initial_interval_secs, self.max_interval_secs
            )));
        }
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(ShootError::config_error(format!(
                "waiter.multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}
