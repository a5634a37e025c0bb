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

//! Wire types of the gardener REST API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub auth: AuthCredentials<'a>,
}

#[derive(Debug, Serialize)]
pub struct AuthCredentials<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub result: String,
    pub token: String,
}

// ============================================================================
// Shoot cluster requests
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShootClusterRequest {
    pub shoot: ShootClusterRequestConfig,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShootClusterRequestConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<K8sVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderDetailsRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hibernation: Option<HibernationSchedules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<MaintenanceDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct K8sVersion {
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetailsRequest {
    pub infrastructure_config: InfrastructureConfigDetails,
    pub workers: Vec<WorkerRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfigDetails {
    #[serde(default)]
    pub floating_pool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<WorkerNetwork>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkerNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<Router>,
    /// Worker CIDR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Router {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerGroupRequest {
    pub worker: WorkerRequest,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerRequest {
    pub name: String,
    pub minimum: i16,
    pub maximum: i16,
    pub machine: MachineDetails,
    pub volume: VolumeDetails,
    pub annotations: Vec<KeyValuePair>,
    pub labels: Vec<KeyValuePair>,
    pub taints: Vec<WireTaint>,
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MachineDetails {
    #[serde(rename = "type", default)]
    pub machine_type: String,
    #[serde(default)]
    pub image: ImageDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolumeDetails {
    #[serde(default)]
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireTaint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub effect: String,
}

/// Schedules are always serialized, so an empty list clears them on update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HibernationSchedules {
    pub schedules: Vec<WireHibernationSchedule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WireHibernationSchedule {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default, skip_serializing)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<AutoUpdateDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindowDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoUpdateDetails {
    #[serde(default)]
    pub kubernetes_version: bool,
    #[serde(default)]
    pub machine_image_version: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimeWindowDetails {
    #[serde(default)]
    pub begin: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct KubeconfigRequest {
    pub duration: u64,
}

// ============================================================================
// Shoot cluster responses
// ============================================================================

/// Create and mutate calls answer with `{"shoot": {...}}`; reads answer with
/// the full `metadata`/`spec`/`status` document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShootResponseBody {
    Wrapped { shoot: ShootSummary },
    Full(ShootClusterResponse),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(flatten)]
    pub spec: SpecFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShootClusterResponse {
    #[serde(default)]
    pub metadata: MetadataFields,
    #[serde(default)]
    pub spec: SpecFields,
    #[serde(default)]
    pub status: StatusFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecFields {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub provider: ProviderDetailsResponse,
    #[serde(default)]
    pub kubernetes: K8sVersion,
    #[serde(default)]
    pub hibernation: Option<HibernationDetails>,
    #[serde(default)]
    pub maintenance: Option<MaintenanceDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetailsResponse {
    #[serde(default)]
    pub infrastructure_config: InfrastructureConfigDetails,
    #[serde(default)]
    pub workers: Vec<WorkerResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HibernationDetails {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub schedules: Vec<WireHibernationSchedule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub minimum: i16,
    #[serde(default)]
    pub maximum: i16,
    #[serde(default)]
    pub machine: MachineDetails,
    #[serde(default)]
    pub volume: VolumeDetails,
    #[serde(default)]
    pub annotations: Option<KeyValues>,
    #[serde(default)]
    pub labels: Option<KeyValues>,
    #[serde(default)]
    pub taints: Option<Vec<WireTaint>>,
    #[serde(default)]
    pub zones: Option<Vec<String>>,
}

/// Annotations and labels come back either as a map or as a key/value list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KeyValues {
    Map(BTreeMap<String, String>),
    List(Vec<KeyValuePair>),
}

impl KeyValues {
    pub fn into_map(self) -> BTreeMap<String, String> {
        match self {
            KeyValues::Map(map) => map,
            KeyValues::List(list) => list.into_iter().map(|kv| (kv.key, kv.value)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFields {
    #[serde(default)]
    pub conditions: Vec<WireCondition>,
    #[serde(default)]
    pub hibernated: bool,
    #[serde(default)]
    pub last_operation: Option<WireLastOperation>,
    #[serde(default)]
    pub advertised_addresses: Vec<WireAdvertisedAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCondition {
    #[serde(rename = "type", default)]
    pub condition_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLastOperation {
    #[serde(rename = "type", default)]
    pub operation_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub progress: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAdvertisedAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// Cloud profile
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudProfileResponse {
    #[serde(default)]
    pub spec: CloudProfileSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileSpec {
    #[serde(default)]
    pub kubernetes: CloudProfileKubernetes,
    #[serde(default)]
    pub machine_images: Vec<CloudProfileMachineImage>,
    #[serde(default)]
    pub machine_types: Vec<CloudProfileMachineType>,
    #[serde(default)]
    pub regions: Vec<CloudProfileRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudProfileKubernetes {
    #[serde(default)]
    pub versions: Vec<CpVersion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpVersion {
    pub version: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudProfileMachineImage {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<CpVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudProfileMachineType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub gpu: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub usable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudProfileRegion {
    pub name: String,
    #[serde(default)]
    pub zones: Vec<CloudProfileZone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudProfileZone {
    pub name: String,
}
