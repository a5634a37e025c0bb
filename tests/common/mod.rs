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

#![allow(dead_code)]

use shootctl::domain::cluster::observed::{Condition, LastOperation, NetworkStatus};
use shootctl::domain::cluster::profile::{MachineImage, Region, VersionEntry};
use shootctl::domain::cluster::{
    ClusterObserved, ClusterRef, ClusterSpec, ClusterUpdate, CloudProfile, ShootClusterDescriptor,
    WorkerGroupSpec,
};
use shootctl::domain::config::{ProviderConfig, TimeoutConfig, WaiterConfig};
use shootctl::infrastructure::cleura::ShootClusterClient;
use shootctl::{Result, ShootError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const UID: &str = "uid-1";

/// In-memory stand-in for the Cleura gateway.
///
/// Mutations change a single remote cluster that is always reported as
/// ready and reconciled, so every wait settles on its first poll unless
/// `queue_fetch` pushes other answers in front.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    remote: Option<ClusterObserved>,
    fetch_queue: VecDeque<Result<ClusterObserved>>,
    failures: HashMap<String, (u16, String)>,
    profile: CloudProfile,
    drop_uid: bool,
    reconcile_polls: usize,
    pending_polls: usize,
    created: Option<ClusterSpec>,
    updates: Vec<ClusterUpdate>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_remote(remote: ClusterObserved) -> Arc<Self> {
        let fake = Self::new();
        fake.state.lock().unwrap().remote = Some(remote);
        fake
    }

    pub fn set_profile(&self, profile: CloudProfile) {
        self.state.lock().unwrap().profile = profile;
    }

    /// Answer the call with `label` with an API error instead.
    pub fn fail_on(&self, label: &str, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(label.to_string(), (status, body.to_string()));
    }

    pub fn queue_fetch(&self, answer: Result<ClusterObserved>) {
        self.state.lock().unwrap().fetch_queue.push_back(answer);
    }

    /// After every mutation the next `polls` fetches still report the
    /// reconcile as processing.
    pub fn slow_reconcile(&self, polls: usize) {
        self.state.lock().unwrap().reconcile_polls = polls;
    }

    /// Responses and fetches come back without a uid.
    pub fn drop_uid(&self) {
        self.state.lock().unwrap().drop_uid = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change the remote cluster, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("fetch_cluster") && !c.starts_with("resolve_cloud_profile"))
            .collect()
    }

    pub fn created(&self) -> Option<ClusterSpec> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updates(&self) -> Vec<ClusterUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn remote(&self) -> Option<ClusterObserved> {
        self.state.lock().unwrap().remote.clone()
    }

    fn record(&self, label: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(label.clone());
        match state.failures.get(&label) {
            Some((404, _)) => Err(ShootError::not_found("Shoot", label, "-")),
            Some((status, body)) => Err(ShootError::Api {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn mutate<F>(&self, cluster: &ClusterRef, change: F) -> Result<ClusterObserved>
    where
        F: FnOnce(&mut ClusterObserved),
    {
        let mut state = self.state.lock().unwrap();
        let drop_uid = state.drop_uid;
        state.pending_polls = state.reconcile_polls;
        let remote = state
            .remote
            .as_mut()
            .ok_or_else(|| ShootError::not_found("Shoot", &cluster.name, &cluster.project))?;
        change(remote);
        let mut answer = remote.clone();
        if drop_uid {
            answer.uid = None;
        }
        Ok(answer)
    }
}

#[async_trait::async_trait]
impl ShootClusterClient for FakeGateway {
    async fn fetch_cluster(&self, cluster: &ClusterRef) -> Result<ClusterObserved> {
        self.record("fetch_cluster".to_string())?;
        let mut state = self.state.lock().unwrap();
        if let Some(answer) = state.fetch_queue.pop_front() {
            return answer;
        }
        let mut remote = state
            .remote
            .clone()
            .ok_or_else(|| ShootError::not_found("Shoot", &cluster.name, &cluster.project))?;
        if state.drop_uid {
            remote.uid = None;
        }
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            remote.last_operation = Some(operation("Reconcile", "Processing"));
        }
        Ok(remote)
    }

    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterObserved> {
        self.record("create_cluster".to_string())?;
        let mut state = self.state.lock().unwrap();
        state.created = Some(spec.clone());
        let mut remote = observed_from(spec);
        state.remote = Some(remote.clone());
        if state.drop_uid {
            remote.uid = None;
        }
        Ok(remote)
    }

    async fn update_cluster(
        &self,
        cluster: &ClusterRef,
        update: &ClusterUpdate,
    ) -> Result<ClusterObserved> {
        self.record("update_cluster".to_string())?;
        self.state.lock().unwrap().updates.push(update.clone());
        self.mutate(cluster, |remote| {
            if let Some(v) = &update.kubernetes_version {
                remote.kubernetes_version = v.clone();
            }
            if let Some(schedules) = &update.hibernation_schedules {
                remote.hibernation_schedules = schedules.clone();
            }
            if let Some(maintenance) = &update.maintenance {
                remote.maintenance = maintenance.clone();
            }
        })
    }

    async fn delete_cluster(&self, cluster: &ClusterRef) -> Result<String> {
        self.record("delete_cluster".to_string())?;
        let mut state = self.state.lock().unwrap();
        match state.remote.take() {
            Some(_) => Ok("Shoot deletion accepted".to_string()),
            None => Err(ShootError::not_found("Shoot", &cluster.name, &cluster.project)),
        }
    }

    async fn create_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved> {
        self.record(format!("create_worker_group:{}", worker_group.name))?;
        self.mutate(cluster, |remote| remote.worker_groups.push(worker_group.clone()))
    }

    async fn update_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved> {
        self.record(format!("update_worker_group:{}", worker_group.name))?;
        self.mutate(cluster, |remote| {
            for wg in remote.worker_groups.iter_mut() {
                if wg.name == worker_group.name {
                    *wg = worker_group.clone();
                }
            }
        })
    }

    async fn delete_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &str,
    ) -> Result<ClusterObserved> {
        self.record(format!("delete_worker_group:{}", worker_group))?;
        self.mutate(cluster, |remote| {
            remote.worker_groups.retain(|wg| wg.name != worker_group)
        })
    }

    async fn resolve_cloud_profile(&self, domain: &str) -> Result<CloudProfile> {
        self.record(format!("resolve_cloud_profile:{}", domain))?;
        Ok(self.state.lock().unwrap().profile.clone())
    }

    async fn generate_kubeconfig(&self, cluster: &ClusterRef, duration: Duration) -> Result<String> {
        self.record(format!("generate_kubeconfig:{}", duration.as_secs()))?;
        Ok(format!("apiVersion: v1\nkind: Config\n# {}\n", cluster.name))
    }
}

/// Small budgets so a stuck wait fails fast under a paused clock.
pub fn provider_config() -> ProviderConfig {
    ProviderConfig {
        username: "ops@example.com".to_string(),
        token: Some("token".to_string()),
        timeouts: TimeoutConfig {
            create_secs: 600,
            update_secs: 300,
            delete_secs: 300,
        },
        waiter: WaiterConfig {
            initial_interval_secs: 1,
            max_interval_secs: 8,
            jitter: false,
            tightened_interval_secs: 2,
            ready_threshold_secs: 30,
            reconcile_threshold_secs: 30,
            delete_threshold_secs: 30,
            deadline_headroom_secs: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn descriptor(fake: &Arc<FakeGateway>) -> ShootClusterDescriptor {
    let client: Arc<dyn ShootClusterClient> = fake.clone();
    ShootClusterDescriptor::new(client, &provider_config()).unwrap()
}

/// Worker group with every profile-resolved field already set.
pub fn worker_group(name: &str) -> WorkerGroupSpec {
    let mut wg = WorkerGroupSpec::new(name, "b.2c4gb");
    wg.image_version = Some("1592.1.0".to_string());
    wg.zones = Some(vec!["nova".to_string()]);
    wg
}

pub fn spec(groups: &[&str]) -> ClusterSpec {
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
        worker_groups: groups.iter().map(|n| worker_group(n)).collect(),
        hibernation_schedules: Vec::new(),
        maintenance: Default::default(),
    }
}

/// Remote view of `spec` once the backend has settled.
pub fn observed_from(spec: &ClusterSpec) -> ClusterObserved {
    ClusterObserved {
        cluster: spec.cluster_ref(),
        uid: Some(UID.to_string()),
        kubernetes_version: spec.kubernetes_version.clone().unwrap_or_default(),
        hibernated: false,
        hibernation_schedules: spec.hibernation_schedules.clone(),
        maintenance: spec.maintenance.with_defaults(),
        floating_pool_name: spec.floating_pool_name.clone(),
        network: NetworkStatus {
            network_id: spec.network_id.clone(),
            router_id: spec.router_id.clone(),
            worker_cidr: spec.worker_cidr.clone(),
        },
        worker_groups: spec.worker_groups.clone(),
        conditions: vec![condition("APIServerAvailable", "True")],
        last_operation: Some(operation("Reconcile", "Succeeded")),
        advertised_addresses: Vec::new(),
        last_updated: None,
    }
}

pub fn condition(condition_type: &str, status: &str) -> Condition {
    Condition {
        condition_type: condition_type.to_string(),
        status: status.to_string(),
        message: String::new(),
    }
}

pub fn operation(operation_type: &str, state: &str) -> LastOperation {
    LastOperation {
        operation_type: operation_type.to_string(),
        state: state.to_string(),
        progress: if state == "Succeeded" { 100 } else { 40 },
    }
}

pub fn version(version: &str, classification: &str) -> VersionEntry {
    VersionEntry {
        version: version.to_string(),
        classification: classification.to_string(),
        expiration_date: None,
    }
}

pub fn profile() -> CloudProfile {
    CloudProfile {
        kubernetes_versions: vec![
            version("1.30.0", "supported"),
            version("1.31.2", "supported"),
            version("1.32.0", "preview"),
            version("1.29.9", "deprecated"),
        ],
        machine_images: vec![MachineImage {
            name: "gardenlinux".to_string(),
            versions: vec![
                version("1443.3.0", "supported"),
                version("1592.1.0", "supported"),
            ],
        }],
        machine_types: Vec::new(),
        regions: vec![Region {
            name: "sto2".to_string(),
            zones: vec!["nova".to_string()],
        }],
    }
}
