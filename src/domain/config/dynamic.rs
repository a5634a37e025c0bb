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

use crate::domain::config::provider::ProviderConfig;
use crate::shared::error::{Result, ShootError};
use std::collections::HashMap;
use std::str::FromStr;

/// Apply `-D key=value` overrides on top of file and environment settings.
///
/// Keys are applied in sorted order, so `timeouts.all` lands before the
/// per-lifecycle keys and those win.
pub fn apply_to_provider_config(
    configs: &HashMap<String, String>,
    conf: &mut ProviderConfig,
) -> Result<()> {
    let mut keys: Vec<&String> = configs.keys().collect();
    keys.sort();

    for key in keys {
        let value = &configs[key];
        match key.as_str() {
            "api.host" => conf.host = value.clone(),
            "api.username" => conf.username = value.clone(),
            "api.token" => conf.token = Some(value.clone()),
            "api.password" => conf.password = Some(value.clone()),
            "api.request-timeout" => conf.request_timeout_secs = parse(key, value)?,

            "timeouts.create" => conf.timeouts.create_secs = parse(key, value)?,
            "timeouts.update" => conf.timeouts.update_secs = parse(key, value)?,
            "timeouts.delete" => conf.timeouts.delete_secs = parse(key, value)?,
            "timeouts.all" => {
                let secs = parse(key, value)?;
                conf.timeouts.create_secs = secs;
                conf.timeouts.update_secs = secs;
                conf.timeouts.delete_secs = secs;
            }

            "waiter.initial-interval" => conf.waiter.initial_interval_secs = parse(key, value)?,
            "waiter.max-interval" => conf.waiter.max_interval_secs = parse(key, value)?,
            "waiter.multiplier" => conf.waiter.multiplier = parse(key, value)?,
            "waiter.jitter" => conf.waiter.jitter = parse(key, value)?,
            "waiter.tightened-interval" => conf.waiter.tightened_interval_secs = parse(key, value)?,
            "waiter.ready-threshold" => conf.waiter.ready_threshold_secs = parse(key, value)?,
            "waiter.reconcile-threshold" => {
                conf.waiter.reconcile_threshold_secs = parse(key, value)?
            }
            "waiter.delete-threshold" => conf.waiter.delete_threshold_secs = parse(key, value)?,
            "waiter.deadline-headroom" => conf.waiter.deadline_headroom_secs = parse(key, value)?,

            _ => {
                return Err(ShootError::config_error(format!(
                    "Unknown configuration key: '{}'",
                    key
                )))
            }
        }
    }
    Ok(())
}

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let parts: Vec<&str> = config.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(ShootError::config_error(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            )));
        }

        let key = parts[0].trim();
        let value = parts[1].trim();

        if key.is_empty() {
            return Err(ShootError::config_error(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        ShootError::config_error(format!("Invalid value '{}' for {}: {}", value, key, e))
    })
}
