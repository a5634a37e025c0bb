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

//! Desired-state model for a shoot cluster.

use crate::infrastructure::constants::{
    DEFAULT_FLOATING_POOL, DEFAULT_GARDENER_DOMAIN, DEFAULT_IMAGE_NAME,
    DEFAULT_MAINTENANCE_WINDOW_BEGIN, DEFAULT_MAINTENANCE_WINDOW_END, DEFAULT_VOLUME_SIZE,
};
use crate::shared::error::{Result, ShootError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

/// Identity of a remote cluster: `(domain, name, region, project)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterRef {
    pub domain: String,
    pub name: String,
    pub region: String,
    pub project: String,
}

impl ClusterRef {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            region: region.into(),
            project: project.into(),
        }
    }
}

impl FromStr for ClusterRef {
    type Err = ShootError;

    /// Parses the import identifier `domain,name,region,project`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(ShootError::validation(format!(
                "Expected import identifier with format: domain,name,region,project. Got: {:?}",
                s
            )));
        }
        Ok(Self::new(
            parts[0].trim(),
            parts[1].trim(),
            parts[2].trim(),
            parts[3].trim(),
        ))
    }
}

impl fmt::Display for ClusterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.domain, self.name, self.region, self.project
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub region: String,
    pub project: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Unset means "latest supported" at create time.
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    #[serde(default = "default_floating_pool")]
    pub floating_pool_name: String,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub worker_cidr: Option<String>,
    pub worker_groups: Vec<WorkerGroupSpec>,
    #[serde(default)]
    pub hibernation_schedules: Vec<HibernationSchedule>,
    #[serde(default)]
    pub maintenance: MaintenancePolicy,
}

impl ClusterSpec {
    /// Load a desired-state file; `.toml` is parsed as TOML, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path)?;

        let spec = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(spec)
    }

    pub fn cluster_ref(&self) -> ClusterRef {
        ClusterRef::new(&self.domain, &self.name, &self.region, &self.project)
    }

    /// True when some field still has to be filled from the cloud profile.
    pub fn needs_resolution(&self) -> bool {
        self.kubernetes_version.is_none()
            || self
                .worker_groups
                .iter()
                .any(|wg| wg.image_version.is_none() || wg.zones.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerGroupSpec {
    pub name: String,
    pub machine_type: String,
    #[serde(default = "default_image_name")]
    pub image_name: String,
    #[serde(default)]
    pub image_version: Option<String>,
    #[serde(default = "default_volume_size")]
    pub volume_size: String,
    pub min_nodes: i64,
    pub max_nodes: i64,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub taints: Vec<Taint>,
    /// Unset means "every zone of the cluster's region".
    #[serde(default)]
    pub zones: Option<Vec<String>>,
}

impl WorkerGroupSpec {
    pub fn new(name: impl Into<String>, machine_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            machine_type: machine_type.into(),
            image_name: default_image_name(),
            image_version: None,
            volume_size: default_volume_size(),
            min_nodes: 1,
            max_nodes: 3,
            annotations: BTreeMap::new(),
            labels: BTreeMap::new(),
            taints: Vec::new(),
            zones: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: TaintEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    NoExecute,
    PreferNoSchedule,
}

impl TaintEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::NoExecute => "NoExecute",
            TaintEffect::PreferNoSchedule => "PreferNoSchedule",
        }
    }
}

impl FromStr for TaintEffect {
    type Err = ShootError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NoSchedule" => Ok(TaintEffect::NoSchedule),
            "NoExecute" => Ok(TaintEffect::NoExecute),
            "PreferNoSchedule" => Ok(TaintEffect::PreferNoSchedule),
            _ => Err(ShootError::validation(format!(
                "Invalid taint effect: {} (expected NoSchedule, NoExecute or PreferNoSchedule)",
                s
            ))),
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cron-formatted window during which the control plane is powered down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HibernationSchedule {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl HibernationSchedule {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePolicy {
    #[serde(default = "default_true")]
    pub auto_update_kubernetes: bool,
    #[serde(default = "default_true")]
    pub auto_update_machine_image: bool,
    #[serde(default)]
    pub time_window_begin: Option<String>,
    #[serde(default)]
    pub time_window_end: Option<String>,
}

impl Default for MaintenancePolicy {
    fn default() -> Self {
        Self {
            auto_update_kubernetes: true,
            auto_update_machine_image: true,
            time_window_begin: None,
            time_window_end: None,
        }
    }
}

impl MaintenancePolicy {
    /// Fill an unset time window with the backend default.
    pub fn with_defaults(&self) -> Self {
        let mut resolved = self.clone();
        if resolved.time_window_begin.is_none() && resolved.time_window_end.is_none() {
            resolved.time_window_begin = Some(DEFAULT_MAINTENANCE_WINDOW_BEGIN.to_string());
            resolved.time_window_end = Some(DEFAULT_MAINTENANCE_WINDOW_END.to_string());
        }
        resolved
    }
}

/// Partial cluster update: only the top-level fields that changed are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterUpdate {
    pub kubernetes_version: Option<String>,
    pub hibernation_schedules: Option<Vec<HibernationSchedule>>,
    pub maintenance: Option<MaintenancePolicy>,
}

impl ClusterUpdate {
    pub fn is_empty(&self) -> bool {
        self.kubernetes_version.is_none()
            && self.hibernation_schedules.is_none()
            && self.maintenance.is_none()
    }

    /// Names of the fields carried by this update, for logging and plans.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.kubernetes_version.is_some() {
            fields.push("kubernetes_version");
        }
        if self.hibernation_schedules.is_some() {
            fields.push("hibernation_schedules");
        }
        if self.maintenance.is_some() {
            fields.push("maintenance");
        }
        fields
    }
}

fn default_domain() -> String {
    DEFAULT_GARDENER_DOMAIN.to_string()
}

fn default_floating_pool() -> String {
    DEFAULT_FLOATING_POOL.to_string()
}

fn default_image_name() -> String {
    DEFAULT_IMAGE_NAME.to_string()
}

fn default_volume_size() -> String {
    DEFAULT_VOLUME_SIZE.to_string()
}

fn default_true() -> bool {
    true
}
