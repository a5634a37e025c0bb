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

//! Conversion between the cluster model and the wire types.

use super::models::*;
use crate::domain::cluster::observed::{
    AdvertisedAddress, ClusterObserved, Condition, LastOperation, NetworkStatus,
};
use crate::domain::cluster::profile::{
    CloudProfile, MachineImage, MachineType, Region, VersionEntry,
};
use crate::domain::cluster::spec::{
    ClusterRef, ClusterSpec, ClusterUpdate, HibernationSchedule, MaintenancePolicy, Taint,
    WorkerGroupSpec,
};
use crate::domain::cluster::validator::narrow_node_count;
use crate::shared::error::Result;
use std::collections::BTreeMap;

pub fn create_request(spec: &ClusterSpec) -> Result<ShootClusterRequest> {
    let workers = spec
        .worker_groups
        .iter()
        .map(worker_request)
        .collect::<Result<Vec<_>>>()?;

    let networks = network_request(spec);

    // The backend rejects an empty hibernation block on create.
    let hibernation = if spec.hibernation_schedules.is_empty() {
        None
    } else {
        Some(hibernation_request(&spec.hibernation_schedules))
    };

    Ok(ShootClusterRequest {
        shoot: ShootClusterRequestConfig {
            name: Some(spec.name.clone()),
            kubernetes: spec.kubernetes_version.as_ref().map(|v| K8sVersion {
                version: v.clone(),
            }),
            provider: Some(ProviderDetailsRequest {
                infrastructure_config: InfrastructureConfigDetails {
                    floating_pool_name: spec.floating_pool_name.clone(),
                    networks,
                },
                workers,
            }),
            hibernation,
            maintenance: Some(maintenance_request(&spec.maintenance)),
        },
    })
}

/// Only the fields carried by `update` are sent.
pub fn update_request(update: &ClusterUpdate) -> ShootClusterRequest {
    ShootClusterRequest {
        shoot: ShootClusterRequestConfig {
            kubernetes: update.kubernetes_version.as_ref().map(|v| K8sVersion {
                version: v.clone(),
            }),
            hibernation: update
                .hibernation_schedules
                .as_ref()
                .map(|s| hibernation_request(s)),
            maintenance: update.maintenance.as_ref().map(maintenance_request),
            ..Default::default()
        },
    }
}

pub fn worker_group_request(wg: &WorkerGroupSpec) -> Result<WorkerGroupRequest> {
    Ok(WorkerGroupRequest {
        worker: worker_request(wg)?,
    })
}

pub fn worker_request(wg: &WorkerGroupSpec) -> Result<WorkerRequest> {
    let minimum = narrow_node_count(wg.min_nodes, &wg.name, "min_nodes")?;
    let maximum = narrow_node_count(wg.max_nodes, &wg.name, "max_nodes")?;

    Ok(WorkerRequest {
        name: wg.name.clone(),
        minimum,
        maximum,
        machine: MachineDetails {
            machine_type: wg.machine_type.clone(),
            image: ImageDetails {
                name: wg.image_name.clone(),
                version: wg.image_version.clone().unwrap_or_default(),
            },
        },
        volume: VolumeDetails {
            size: wg.volume_size.clone(),
        },
        annotations: to_pairs(&wg.annotations),
        labels: to_pairs(&wg.labels),
        taints: wg
            .taints
            .iter()
            .map(|t| WireTaint {
                key: t.key.clone(),
                value: t.value.clone(),
                effect: t.effect.as_str().to_string(),
            })
            .collect(),
        zones: wg.zones.clone().unwrap_or_default(),
    })
}

fn network_request(spec: &ClusterSpec) -> Option<WorkerNetwork> {
    let mut network = WorkerNetwork::default();
    if let (Some(network_id), Some(router_id)) = (&spec.network_id, &spec.router_id) {
        network.id = Some(network_id.clone());
        network.router = Some(Router {
            id: router_id.clone(),
        });
    }
    network.workers = spec.worker_cidr.clone();

    if network == WorkerNetwork::default() {
        None
    } else {
        Some(network)
    }
}

fn hibernation_request(schedules: &[HibernationSchedule]) -> HibernationSchedules {
    HibernationSchedules {
        schedules: schedules
            .iter()
            .map(|s| WireHibernationSchedule {
                start: s.start.clone().unwrap_or_default(),
                end: s.end.clone().unwrap_or_default(),
                location: String::new(),
            })
            .collect(),
    }
}

fn maintenance_request(policy: &MaintenancePolicy) -> MaintenanceDetails {
    let time_window = match (&policy.time_window_begin, &policy.time_window_end) {
        (Some(begin), Some(end)) => Some(TimeWindowDetails {
            begin: begin.clone(),
            end: end.clone(),
        }),
        _ => None,
    };
    MaintenanceDetails {
        auto_update: Some(AutoUpdateDetails {
            kubernetes_version: policy.auto_update_kubernetes,
            machine_image_version: policy.auto_update_machine_image,
        }),
        time_window,
    }
}

fn to_pairs(map: &BTreeMap<String, String>) -> Vec<KeyValuePair> {
    map.iter()
        .map(|(key, value)| KeyValuePair {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Map any shoot response onto the observed model of `cluster`.
pub fn observed_from_response(cluster: &ClusterRef, body: ShootResponseBody) -> ClusterObserved {
    match body {
        ShootResponseBody::Wrapped { shoot } => {
            let mut observed = observed_from_spec(cluster, shoot.uid, &shoot.spec);
            observed.hibernated = shoot
                .spec
                .hibernation
                .as_ref()
                .is_some_and(|h| h.enabled);
            observed
        }
        ShootResponseBody::Full(full) => {
            let mut observed = observed_from_spec(cluster, full.metadata.uid, &full.spec);
            observed.hibernated = full.status.hibernated;
            observed.conditions = full
                .status
                .conditions
                .into_iter()
                .map(|c| Condition {
                    condition_type: c.condition_type,
                    status: c.status,
                    message: c.message,
                })
                .collect();
            observed.last_operation = full.status.last_operation.map(|op| LastOperation {
                operation_type: op.operation_type,
                state: op.state,
                progress: op.progress,
            });
            observed.advertised_addresses = full
                .status
                .advertised_addresses
                .into_iter()
                .map(|a| AdvertisedAddress {
                    name: a.name,
                    url: a.url,
                })
                .collect();
            observed
        }
    }
}

fn observed_from_spec(cluster: &ClusterRef, uid: Option<String>, spec: &SpecFields) -> ClusterObserved {
    let infra = &spec.provider.infrastructure_config;
    let network = infra
        .networks
        .as_ref()
        .map(|n| NetworkStatus {
            network_id: non_empty(n.id.clone()),
            router_id: non_empty(n.router.as_ref().map(|r| r.id.clone())),
            worker_cidr: non_empty(n.workers.clone()),
        })
        .unwrap_or_default();

    let hibernation_schedules = spec
        .hibernation
        .as_ref()
        .map(|h| {
            h.schedules
                .iter()
                .map(|s| HibernationSchedule {
                    start: non_empty(Some(s.start.clone())),
                    end: non_empty(Some(s.end.clone())),
                })
                .collect()
        })
        .unwrap_or_default();

    let maintenance = spec
        .maintenance
        .as_ref()
        .map(maintenance_from_response)
        .unwrap_or_default();

    ClusterObserved {
        cluster: cluster.clone(),
        uid: non_empty(uid),
        kubernetes_version: spec.kubernetes.version.clone(),
        hibernated: false,
        hibernation_schedules,
        maintenance,
        floating_pool_name: infra.floating_pool_name.clone(),
        network,
        worker_groups: spec
            .provider
            .workers
            .iter()
            .cloned()
            .map(worker_from_response)
            .collect(),
        conditions: Vec::new(),
        last_operation: None,
        advertised_addresses: Vec::new(),
        last_updated: None,
    }
}

fn maintenance_from_response(details: &MaintenanceDetails) -> MaintenancePolicy {
    let defaults = MaintenancePolicy::default();
    MaintenancePolicy {
        auto_update_kubernetes: details
            .auto_update
            .as_ref()
            .map_or(defaults.auto_update_kubernetes, |a| a.kubernetes_version),
        auto_update_machine_image: details
            .auto_update
            .as_ref()
            .map_or(defaults.auto_update_machine_image, |a| a.machine_image_version),
        time_window_begin: non_empty(details.time_window.as_ref().map(|w| w.begin.clone())),
        time_window_end: non_empty(details.time_window.as_ref().map(|w| w.end.clone())),
    }
}

pub fn worker_from_response(worker: WorkerResponse) -> WorkerGroupSpec {
    WorkerGroupSpec {
        name: worker.name,
        machine_type: worker.machine.machine_type,
        image_name: worker.machine.image.name,
        image_version: non_empty(Some(worker.machine.image.version)),
        volume_size: worker.volume.size,
        min_nodes: i64::from(worker.minimum),
        max_nodes: i64::from(worker.maximum),
        annotations: worker.annotations.map(KeyValues::into_map).unwrap_or_default(),
        labels: worker.labels.map(KeyValues::into_map).unwrap_or_default(),
        taints: worker
            .taints
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| match t.effect.parse() {
                Ok(effect) => Some(Taint {
                    key: t.key,
                    value: t.value,
                    effect,
                }),
                Err(_) => {
                    tracing::warn!(key = %t.key, effect = %t.effect, "ignoring taint with unknown effect");
                    None
                }
            })
            .collect(),
        zones: worker.zones.filter(|z| !z.is_empty()),
    }
}

pub fn profile_from_response(response: CloudProfileResponse) -> CloudProfile {
    let versions = |list: Vec<CpVersion>| -> Vec<VersionEntry> {
        list.into_iter()
            .map(|v| VersionEntry {
                version: v.version,
                classification: v.classification,
                expiration_date: non_empty(v.expiration_date),
            })
            .collect()
    };

    let spec = response.spec;
    CloudProfile {
        kubernetes_versions: versions(spec.kubernetes.versions),
        machine_images: spec
            .machine_images
            .into_iter()
            .map(|mi| MachineImage {
                name: mi.name,
                versions: versions(mi.versions),
            })
            .collect(),
        machine_types: spec
            .machine_types
            .into_iter()
            .map(|mt| MachineType {
                name: mt.name,
                cpu: mt.cpu,
                memory: mt.memory,
                gpu: mt.gpu,
                architecture: mt.architecture,
                usable: mt.usable,
            })
            .collect(),
        regions: spec
            .regions
            .into_iter()
            .map(|r| Region {
                name: r.name,
                zones: r.zones.into_iter().map(|z| z.name).collect(),
            })
            .collect(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::spec::TaintEffect;
    use serde_json::json;

    fn spec() -> ClusterSpec {
        let mut wg = WorkerGroupSpec::new("wg1", "b.2c4gb");
        wg.image_version = Some("1592.1.0".to_string());
        wg.zones = Some(vec!["nova".to_string()]);
        wg.labels.insert("tier".to_string(), "web".to_string());
        wg.taints.push(Taint {
            key: "dedicated".to_string(),
            value: "gpu".to_string(),
            effect: TaintEffect::NoSchedule,
        });
        ClusterSpec {
            name: "demo".to_string(),
            region: "sto2".to_string(),
            project: "p1".to_string(),
            domain: "public".to_string(),
            kubernetes_version: Some("1.31.2".to_string()),
            floating_pool_name: "ext-net".to_string(),
            network_id: None,
            router_id: None,
            worker_cidr: None,
            worker_groups: vec![wg],
            hibernation_schedules: Vec::new(),
            maintenance: MaintenancePolicy::default().with_defaults(),
        }
    }

    #[test]
    fn test_create_request_shape() {
        let request = create_request(&spec()).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["shoot"]["name"], "demo");
        assert_eq!(value["shoot"]["kubernetes"]["version"], "1.31.2");
        assert!(value["shoot"].get("hibernation").is_none());
        assert!(value["shoot"]["provider"]["infrastructureConfig"]
            .get("networks")
            .is_none());
        let worker = &value["shoot"]["provider"]["workers"][0];
        assert_eq!(worker["minimum"], 1);
        assert_eq!(worker["machine"]["type"], "b.2c4gb");
        assert_eq!(worker["labels"], json!([{"key": "tier", "value": "web"}]));
        assert_eq!(worker["taints"][0]["effect"], "NoSchedule");
        assert_eq!(
            value["shoot"]["maintenance"]["timeWindow"]["begin"],
            "000000+0100"
        );
    }

    #[test]
    fn test_create_request_with_network_and_overflow() {
        let mut s = spec();
        s.network_id = Some("net".to_string());
        s.router_id = Some("rt".to_string());
        s.worker_cidr = Some("10.250.0.0/16".to_string());
        let value = serde_json::to_value(create_request(&s).unwrap()).unwrap();
        let networks = &value["shoot"]["provider"]["infrastructureConfig"]["networks"];
        assert_eq!(networks["router"]["id"], "rt");
        assert_eq!(networks["workers"], "10.250.0.0/16");

        s.worker_groups[0].max_nodes = 70_000;
        assert!(create_request(&s).unwrap_err().is_validation());
    }

    #[test]
    fn test_update_request_is_partial() {
        let update = ClusterUpdate {
            hibernation_schedules: Some(Vec::new()),
            ..Default::default()
        };
        let value = serde_json::to_value(update_request(&update)).unwrap();
        assert_eq!(value, json!({"shoot": {"hibernation": {"schedules": []}}}));
    }

    #[test]
    fn test_observed_from_full_response() {
        let body: ShootResponseBody = serde_json::from_value(json!({
            "metadata": {"name": "demo", "uid": "abc"},
            "spec": {
                "region": "sto2",
                "kubernetes": {"version": "1.31.2"},
                "provider": {
                    "infrastructureConfig": {
                        "floatingPoolName": "ext-net",
                        "networks": {"id": "net", "router": {"id": "rt"}, "workers": "10.250.0.0/16"}
                    },
                    "workers": [{
                        "name": "wg1", "minimum": 1, "maximum": 3,
                        "machine": {"type": "b.2c4gb", "image": {"name": "gardenlinux", "version": "1592.1.0"}},
                        "volume": {"size": "50Gi"},
                        "annotations": {"a": "1"},
                        "labels": [{"key": "tier", "value": "web"}],
                        "zones": ["nova"]
                    }]
                },
                "maintenance": {
                    "autoUpdate": {"kubernetesVersion": false, "machineImageVersion": true},
                    "timeWindow": {"begin": "220000+0100", "end": "230000+0100"}
                }
            },
            "status": {
                "hibernated": false,
                "conditions": [{"type": "APIServerAvailable", "status": "True", "message": "ok"}],
                "lastOperation": {"type": "Reconcile", "state": "Succeeded", "progress": 100}
            }
        }))
        .unwrap();

        let cluster = ClusterRef::new("public", "demo", "sto2", "p1");
        let observed = observed_from_response(&cluster, body);
        assert_eq!(observed.uid.as_deref(), Some("abc"));
        assert_eq!(observed.network.router_id.as_deref(), Some("rt"));
        assert!(observed.is_ready());
        assert!(observed.is_reconciled());
        assert!(!observed.maintenance.auto_update_kubernetes);

        let wg = &observed.worker_groups[0];
        assert_eq!(wg.annotations.get("a").map(String::as_str), Some("1"));
        assert_eq!(wg.labels.get("tier").map(String::as_str), Some("web"));
        assert_eq!(wg.zones, Some(vec!["nova".to_string()]));
    }

    #[test]
    fn test_wrapped_response_without_uid() {
        let body: ShootResponseBody = serde_json::from_value(json!({
            "shoot": {
                "name": "demo",
                "kubernetes": {"version": "1.31.2"},
                "hibernation": {"enabled": true, "schedules": []},
                "provider": {"infrastructureConfig": {"floatingPoolName": "ext-net"}, "workers": []}
            }
        }))
        .unwrap();

        let cluster = ClusterRef::new("public", "demo", "sto2", "p1");
        let observed = observed_from_response(&cluster, body);
        assert!(observed.uid.is_none());
        assert!(observed.hibernated);
        assert_eq!(observed.kubernetes_version, "1.31.2");
    }

    #[test]
    fn test_profile_from_response() {
        let response: CloudProfileResponse = serde_json::from_value(json!({
            "spec": {
                "kubernetes": {"versions": [
                    {"version": "1.31.2", "classification": "supported", "expirationDate": ""},
                    {"version": "1.32.0", "classification": "preview"}
                ]},
                "machineImages": [{"name": "gardenlinux", "versions": [{"version": "1592.1.0", "classification": "supported"}]}],
                "regions": [{"name": "sto2", "zones": [{"name": "nova"}]}]
            }
        }))
        .unwrap();

        let profile = profile_from_response(response);
        assert_eq!(profile.kubernetes_versions[0].expiration_date, None);
        assert_eq!(profile.zones_in("sto2"), Some(vec!["nova".to_string()]));
        assert_eq!(profile.latest_kubernetes_version().unwrap(), "1.31.2");
    }
}
