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

//! Remote (observed) state of a shoot cluster.

use crate::domain::cluster::spec::{
    ClusterRef, ClusterSpec, HibernationSchedule, MaintenancePolicy, WorkerGroupSpec,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONDITION_TRUE: &str = "True";
pub const OPERATION_SUCCEEDED: &str = "Succeeded";
pub const OPERATION_CREATE: &str = "Create";
pub const OPERATION_RECONCILE: &str = "Reconcile";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObserved {
    pub cluster: ClusterRef,
    #[serde(default)]
    pub uid: Option<String>,
    pub kubernetes_version: String,
    #[serde(default)]
    pub hibernated: bool,
    #[serde(default)]
    pub hibernation_schedules: Vec<HibernationSchedule>,
    #[serde(default)]
    pub maintenance: MaintenancePolicy,
    #[serde(default)]
    pub floating_pool_name: String,
    #[serde(default)]
    pub network: NetworkStatus,
    #[serde(default)]
    pub worker_groups: Vec<WorkerGroupSpec>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub last_operation: Option<LastOperation>,
    #[serde(default)]
    pub advertised_addresses: Vec<AdvertisedAddress>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub network_id: Option<String>,
    pub router_id: Option<String>,
    pub worker_cidr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(rename = "type")]
    pub operation_type: String,
    pub state: String,
    #[serde(default)]
    pub progress: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisedAddress {
    pub name: String,
    pub url: String,
}

impl ClusterObserved {
    /// Every condition reports "True"; an empty list is not ready yet.
    pub fn is_ready(&self) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.status == CONDITION_TRUE)
    }

    pub fn pending_conditions(&self) -> Vec<&Condition> {
        self.conditions
            .iter()
            .filter(|c| c.status != CONDITION_TRUE)
            .collect()
    }

    /// The last Create or Reconcile operation finished successfully.
    pub fn is_reconciled(&self) -> bool {
        self.last_operation.as_ref().is_some_and(|op| {
            op.state == OPERATION_SUCCEEDED
                && (op.operation_type == OPERATION_CREATE
                    || op.operation_type == OPERATION_RECONCILE)
        })
    }

    pub fn worker_group(&self, name: &str) -> Option<&WorkerGroupSpec> {
        self.worker_groups.iter().find(|wg| wg.name == name)
    }

    /// Keep a previously known UID when a response comes back without one.
    pub fn preserve_uid(mut self, previous: Option<&str>) -> Self {
        if self.uid.as_deref().map_or(true, str::is_empty) {
            if let Some(uid) = previous.filter(|u| !u.is_empty()) {
                tracing::warn!(
                    cluster = %self.cluster.name,
                    "response carried no uid, keeping previously known value"
                );
                self.uid = Some(uid.to_string());
            } else {
                self.uid = None;
            }
        }
        self
    }

    /// Desired-state view of this cluster, used when importing.
    pub fn to_spec(&self) -> ClusterSpec {
        ClusterSpec {
            name: self.cluster.name.clone(),
            region: self.cluster.region.clone(),
            project: self.cluster.project.clone(),
            domain: self.cluster.domain.clone(),
            kubernetes_version: Some(self.kubernetes_version.clone()),
            floating_pool_name: self.floating_pool_name.clone(),
            network_id: self.network.network_id.clone(),
            router_id: self.network.router_id.clone(),
            worker_cidr: self.network.worker_cidr.clone(),
            worker_groups: self.worker_groups.clone(),
            hibernation_schedules: self.hibernation_schedules.clone(),
            maintenance: self.maintenance.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed() -> ClusterObserved {
        ClusterObserved {
            cluster: ClusterRef::new("public", "demo", "sto2", "p1"),
            uid: Some("uid-1".to_string()),
            kubernetes_version: "1.31.2".to_string(),
            hibernated: false,
            hibernation_schedules: Vec::new(),
            maintenance: MaintenancePolicy::default().with_defaults(),
            floating_pool_name: "ext-net".to_string(),
            network: NetworkStatus::default(),
            worker_groups: Vec::new(),
            conditions: Vec::new(),
            last_operation: None,
            advertised_addresses: Vec::new(),
            last_updated: None,
        }
    }

    fn condition(status: &str) -> Condition {
        Condition {
            condition_type: "APIServerAvailable".to_string(),
            status: status.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_ready_requires_conditions() {
        let mut obs = observed();
        assert!(!obs.is_ready());

        obs.conditions = vec![condition("True"), condition("Progressing")];
        assert!(!obs.is_ready());
        assert_eq!(obs.pending_conditions().len(), 1);

        obs.conditions = vec![condition("True"), condition("True")];
        assert!(obs.is_ready());
    }

    #[test]
    fn test_reconciled_only_after_create_or_reconcile() {
        let mut obs = observed();
        assert!(!obs.is_reconciled());

        for (op_type, state, expected) in [
            ("Reconcile", "Succeeded", true),
            ("Create", "Succeeded", true),
            ("Reconcile", "Processing", false),
            ("Delete", "Succeeded", false),
        ] {
            obs.last_operation = Some(LastOperation {
                operation_type: op_type.to_string(),
                state: state.to_string(),
                progress: 100,
            });
            assert_eq!(obs.is_reconciled(), expected, "{} {}", op_type, state);
        }
    }

    #[test]
    fn test_preserve_uid() {
        let mut obs = observed();
        obs.uid = None;
        assert_eq!(obs.clone().preserve_uid(Some("old")).uid.as_deref(), Some("old"));

        obs.uid = Some(String::new());
        assert_eq!(obs.clone().preserve_uid(None).uid, None);

        obs.uid = Some("new".to_string());
        assert_eq!(obs.preserve_uid(Some("old")).uid.as_deref(), Some("new"));
    }
}
