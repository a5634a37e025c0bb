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

use crate::domain::cluster::spec::{ClusterSpec, MaintenancePolicy, WorkerGroupSpec};
use crate::infrastructure::constants::MAX_WORKER_GROUP_NAME_LEN;
use crate::shared::error::{Result, ShootError};
use regex::Regex;
use std::collections::HashSet;

const WORKER_GROUP_NAME_PATTERN: &str = "^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";

/// Checks a desired cluster before any gateway call is made.
pub struct ClusterValidator {
    name_pattern: Regex,
}

impl ClusterValidator {
    pub fn new() -> Result<Self> {
        let name_pattern = Regex::new(WORKER_GROUP_NAME_PATTERN)
            .map_err(|e| ShootError::config_error(format!("Invalid name pattern: {}", e)))?;
        Ok(Self { name_pattern })
    }

    /// Validate the whole spec and report every problem at once.
    pub fn validate(&self, spec: &ClusterSpec) -> Result<()> {
        let mut problems = Vec::new();

        if spec.name.trim().is_empty() {
            problems.push("cluster name must not be empty".to_string());
        }
        if spec.region.trim().is_empty() {
            problems.push("region must not be empty".to_string());
        }
        if spec.project.trim().is_empty() {
            problems.push("project must not be empty".to_string());
        }

        match (&spec.network_id, &spec.router_id) {
            (Some(_), None) => {
                problems.push("network_id is set but router_id is not; both must be set together".to_string())
            }
            (None, Some(_)) => {
                problems.push("router_id is set but network_id is not; both must be set together".to_string())
            }
            _ => {}
        }

        for (i, schedule) in spec.hibernation_schedules.iter().enumerate() {
            if schedule.start.as_deref().map_or(true, str::is_empty) {
                problems.push(format!("hibernation schedule #{} has no start", i + 1));
            }
            if schedule.end.as_deref().map_or(true, str::is_empty) {
                problems.push(format!("hibernation schedule #{} has no end", i + 1));
            }
        }

        self.check_maintenance(&spec.maintenance, &mut problems);

        let mut seen = HashSet::new();
        for wg in &spec.worker_groups {
            if !seen.insert(wg.name.as_str()) {
                problems.push(format!("worker group name '{}' is used more than once", wg.name));
            }
            self.check_worker_group(wg, &mut problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ShootError::validation(format!(
                "cluster '{}' is invalid:\n  - {}",
                spec.name,
                problems.join("\n  - ")
            )))
        }
    }

    pub fn is_valid_worker_group_name(&self, name: &str) -> bool {
        name.len() <= MAX_WORKER_GROUP_NAME_LEN && self.name_pattern.is_match(name)
    }

    fn check_worker_group(&self, wg: &WorkerGroupSpec, problems: &mut Vec<String>) {
        if !self.is_valid_worker_group_name(&wg.name) {
            problems.push(format!(
                "worker group name '{}' must be 1-{} lowercase alphanumerics or '-', not starting or ending with '-'",
                wg.name, MAX_WORKER_GROUP_NAME_LEN
            ));
        }
        if wg.machine_type.trim().is_empty() {
            problems.push(format!("worker group '{}' has no machine_type", wg.name));
        }
        if wg.min_nodes < 0 {
            problems.push(format!("worker group '{}' min_nodes must not be negative", wg.name));
        }
        if wg.min_nodes > wg.max_nodes {
            problems.push(format!(
                "worker group '{}' min_nodes ({}) is greater than max_nodes ({})",
                wg.name, wg.min_nodes, wg.max_nodes
            ));
        }
        for (field, value) in [("min_nodes", wg.min_nodes), ("max_nodes", wg.max_nodes)] {
            if let Err(e) = narrow_node_count(value, &wg.name, field) {
                problems.push(e.to_string());
            }
        }
        if let Some(zones) = &wg.zones {
            if zones.is_empty() {
                problems.push(format!(
                    "worker group '{}' lists no zones; omit the field to use every zone of the region",
                    wg.name
                ));
            }
        }
    }

    fn check_maintenance(&self, policy: &MaintenancePolicy, problems: &mut Vec<String>) {
        match (&policy.time_window_begin, &policy.time_window_end) {
            (Some(begin), Some(end)) if begin == end => problems.push(format!(
                "maintenance window begin and end are both '{}'",
                begin
            )),
            (Some(_), None) | (None, Some(_)) => problems
                .push("maintenance window needs both time_window_begin and time_window_end".to_string()),
            _ => {}
        }
    }
}

/// Narrow a node count to the 16-bit range used on the wire.
pub fn narrow_node_count(value: i64, worker_group: &str, field: &str) -> Result<i16> {
    i16::try_from(value).map_err(|_| {
        ShootError::validation(format!(
            "worker group '{}' {} value {} does not fit in the range {}..={}",
            worker_group,
            field,
            value,
            i16::MIN,
            i16::MAX
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::spec::HibernationSchedule;

    fn spec() -> ClusterSpec {
        ClusterSpec {
            name: "demo".to_string(),
            region: "sto2".to_string(),
            project: "p1".to_string(),
            domain: "public".to_string(),
            kubernetes_version: None,
            floating_pool_name: "ext-net".to_string(),
            network_id: None,
            router_id: None,
            worker_cidr: None,
            worker_groups: vec![WorkerGroupSpec::new("wg1", "b.2c4gb")],
            hibernation_schedules: Vec::new(),
            maintenance: MaintenancePolicy::default(),
        }
    }

    fn message(spec: &ClusterSpec) -> String {
        ClusterValidator::new().unwrap().validate(spec).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_spec() {
        assert!(ClusterValidator::new().unwrap().validate(&spec()).is_ok());
    }

    #[test]
    fn test_network_router_pair() {
        let mut s = spec();
        s.network_id = Some("net-1".to_string());
        assert!(message(&s).contains("router_id is not"));

        s.router_id = Some("rt-1".to_string());
        assert!(ClusterValidator::new().unwrap().validate(&s).is_ok());
    }

    #[test]
    fn test_worker_group_names() {
        let v = ClusterValidator::new().unwrap();
        for ok in ["a", "wg1", "a-b", "abcdef"] {
            assert!(v.is_valid_worker_group_name(ok), "{}", ok);
        }
        for bad in ["", "-a", "a-", "abcdefg", "Wg1", "w_g", "wg1\n"] {
            assert!(!v.is_valid_worker_group_name(bad), "{:?}", bad);
        }
    }

    #[test]
    fn test_duplicate_names_and_bounds_are_collected() {
        let mut s = spec();
        let mut dup = WorkerGroupSpec::new("wg1", "b.2c4gb");
        dup.min_nodes = 5;
        dup.max_nodes = 40_000;
        s.worker_groups.push(dup);

        let msg = message(&s);
        assert!(msg.contains("used more than once"));
        assert!(msg.contains("does not fit"));
    }

    #[test]
    fn test_min_greater_than_max() {
        let mut s = spec();
        s.worker_groups[0].min_nodes = 4;
        s.worker_groups[0].max_nodes = 2;
        assert!(message(&s).contains("greater than max_nodes"));
    }

    #[test]
    fn test_hibernation_and_maintenance_window() {
        let mut s = spec();
        s.hibernation_schedules = vec![HibernationSchedule {
            start: Some("00 20 * * 1,2,3,4,5".to_string()),
            end: None,
        }];
        assert!(message(&s).contains("has no end"));

        let mut s = spec();
        s.maintenance.time_window_begin = Some("000000+0100".to_string());
        assert!(message(&s).contains("needs both"));

        s.maintenance.time_window_end = Some("000000+0100".to_string());
        assert!(message(&s).contains("are both"));
    }

    #[test]
    fn test_narrow_node_count() {
        assert_eq!(narrow_node_count(12, "wg1", "max_nodes").unwrap(), 12);
        assert!(narrow_node_count(i16::MAX as i64 + 1, "wg1", "max_nodes")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_empty_worker_groups_allowed() {
        let mut s = spec();
        s.worker_groups.clear();
        assert!(ClusterValidator::new().unwrap().validate(&s).is_ok());
    }
}
