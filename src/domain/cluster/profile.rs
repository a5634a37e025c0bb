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

//! Cloud profile: the versions and zones a gardener domain offers.

use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::cluster::spec::ClusterSpec;
use crate::shared::error::{Result, ShootError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const CLASSIFICATION_SUPPORTED: &str = "supported";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudProfile {
    pub kubernetes_versions: Vec<VersionEntry>,
    pub machine_images: Vec<MachineImage>,
    #[serde(default)]
    pub machine_types: Vec<MachineType>,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

impl VersionEntry {
    pub fn is_supported(&self) -> bool {
        self.classification == CLASSIFICATION_SUPPORTED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineImage {
    pub name: String,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineType {
    pub name: String,
    pub cpu: String,
    pub memory: String,
    pub gpu: String,
    pub architecture: String,
    pub usable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub zones: Vec<String>,
}

impl CloudProfile {
    /// Highest Kubernetes version classified as supported.
    pub fn latest_kubernetes_version(&self) -> Result<String> {
        latest_supported(&self.kubernetes_versions).ok_or_else(|| {
            ShootError::validation("cloud profile lists no supported Kubernetes version")
        })
    }

    /// Highest supported version of the named machine image.
    pub fn latest_machine_image_version(&self, image: &str) -> Result<String> {
        self.machine_images
            .iter()
            .filter(|mi| mi.name == image)
            .find_map(|mi| latest_supported(&mi.versions))
            .ok_or_else(|| {
                ShootError::validation(format!(
                    "cloud profile lists no supported version of machine image '{}'",
                    image
                ))
            })
    }

    pub fn zones_in(&self, region: &str) -> Option<Vec<String>> {
        self.regions
            .iter()
            .find(|r| r.name == region)
            .map(|r| r.zones.clone())
    }

    /// Copy of the profile with every non-supported version dropped.
    pub fn supported_only(&self) -> Self {
        let keep = |versions: &[VersionEntry]| -> Vec<VersionEntry> {
            versions.iter().filter(|v| v.is_supported()).cloned().collect()
        };
        Self {
            kubernetes_versions: keep(&self.kubernetes_versions),
            machine_images: self
                .machine_images
                .iter()
                .map(|mi| MachineImage {
                    name: mi.name.clone(),
                    versions: keep(&mi.versions),
                })
                .collect(),
            machine_types: self.machine_types.clone(),
            regions: self.regions.clone(),
        }
    }

    /// Fill every unset version and zone field of `spec`.
    ///
    /// A field already known on the remote cluster keeps that value, so an
    /// unset field never turns into an upgrade on its own. Anything still
    /// unset falls back to the latest supported entry of this profile.
    pub fn resolve(&self, spec: &ClusterSpec, observed: Option<&ClusterObserved>) -> Result<ClusterSpec> {
        let mut resolved = spec.clone();

        if resolved.kubernetes_version.is_none() {
            let version = match observed.map(|o| o.kubernetes_version.as_str()) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => self.latest_kubernetes_version()?,
            };
            resolved.kubernetes_version = Some(version);
        }

        for wg in resolved.worker_groups.iter_mut() {
            let known = observed.and_then(|o| o.worker_group(&wg.name));

            if wg.image_version.is_none() {
                let version = match known.and_then(|k| k.image_version.clone()) {
                    Some(v) if !v.is_empty() => v,
                    _ => self.latest_machine_image_version(&wg.image_name)?,
                };
                wg.image_version = Some(version);
            }

            if wg.zones.is_none() {
                let zones = match known.and_then(|k| k.zones.clone()) {
                    Some(z) if !z.is_empty() => z,
                    _ => self.zones_in(&spec.region).ok_or_else(|| {
                        ShootError::validation(format!(
                            "region '{}' is not offered by the cloud profile of domain '{}'",
                            spec.region, spec.domain
                        ))
                    })?,
                };
                wg.zones = Some(zones);
            }
        }

        resolved.maintenance = resolved.maintenance.with_defaults();
        Ok(resolved)
    }
}

fn latest_supported(versions: &[VersionEntry]) -> Option<String> {
    versions
        .iter()
        .filter(|v| v.is_supported())
        .filter_map(|v| VersionKey::parse(&v.version).map(|key| (key, &v.version)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw.clone())
}

/// Ordering key for dotted numeric versions such as `1.31.2` or `1443.3`.
///
/// Missing components compare as zero and a pre-release suffix (`1.30.0-rc.1`)
/// sorts before the release it precedes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    segments: Vec<u64>,
    pre_release: Option<String>,
}

impl VersionKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_start_matches('v');
        let (core, pre_release) = match raw.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (raw, None),
        };
        let core = core.split('+').next().unwrap_or(core);
        if core.is_empty() {
            return None;
        }

        let segments = core
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            segments,
            pre_release,
        })
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
