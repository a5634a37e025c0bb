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

//! Worker-group differ.
//!
//! Splits desired and observed worker groups, keyed by name, into the groups
//! to modify, create and delete. Groups present on both sides with equal
//! contents appear in none of the lists.

use crate::domain::cluster::spec::WorkerGroupSpec;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerGroupPlan {
    pub to_modify: Vec<WorkerGroupSpec>,
    pub to_create: Vec<WorkerGroupSpec>,
    pub to_delete: Vec<WorkerGroupSpec>,
}

impl WorkerGroupPlan {
    pub fn is_empty(&self) -> bool {
        self.to_modify.is_empty() && self.to_create.is_empty() && self.to_delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_modify.len() + self.to_create.len() + self.to_delete.len()
    }
}

/// Diff desired worker groups against the ones reported by the backend.
///
/// Modify and create entries follow the desired order, delete entries follow
/// the observed order, so the same inputs always give the same plan.
pub fn diff(desired: &[WorkerGroupSpec], observed: &[WorkerGroupSpec]) -> WorkerGroupPlan {
    let desired_by_name: HashMap<&str, &WorkerGroupSpec> =
        desired.iter().map(|wg| (wg.name.as_str(), wg)).collect();
    let observed_by_name: HashMap<&str, &WorkerGroupSpec> =
        observed.iter().map(|wg| (wg.name.as_str(), wg)).collect();

    let mut plan = WorkerGroupPlan::default();

    for wg in desired {
        match observed_by_name.get(wg.name.as_str()) {
            Some(current) if *current != wg => plan.to_modify.push(wg.clone()),
            Some(_) => {}
            None => plan.to_create.push(wg.clone()),
        }
    }

    for wg in observed {
        if !desired_by_name.contains_key(wg.name.as_str()) {
            plan.to_delete.push(wg.clone());
        }
    }

    tracing::debug!(
        modify = plan.to_modify.len(),
        create = plan.to_create.len(),
        delete = plan.to_delete.len(),
        "computed worker group plan"
    );

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wg(name: &str) -> WorkerGroupSpec {
        WorkerGroupSpec::new(name, "b.2c4gb")
    }

    fn names(groups: &[WorkerGroupSpec]) -> Vec<&str> {
        groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_create_and_delete() {
        let plan = diff(&[wg("a"), wg("b")], &[wg("b"), wg("c")]);
        assert_eq!(names(&plan.to_create), vec!["a"]);
        assert_eq!(names(&plan.to_delete), vec!["c"]);
        assert!(plan.to_modify.is_empty());
    }

    #[test]
    fn test_modify_on_any_field() {
        let mut changed = wg("b");
        changed.labels.insert("tier".to_string(), "web".to_string());
        let plan = diff(&[changed], &[wg("b")]);
        assert_eq!(names(&plan.to_modify), vec!["b"]);
        assert_eq!(plan.len(), 1);

        let mut zones = wg("b");
        zones.zones = Some(vec!["nova".to_string()]);
        assert_eq!(diff(&[zones], &[wg("b")]).to_modify.len(), 1);
    }

    #[test]
    fn test_empty_sides() {
        let teardown = diff(&[], &[wg("a"), wg("b")]);
        assert_eq!(teardown.to_delete.len(), 2);
        assert!(teardown.to_create.is_empty());

        let provision = diff(&[wg("a"), wg("b")], &[]);
        assert_eq!(provision.to_create.len(), 2);
        assert!(provision.to_delete.is_empty());

        assert!(diff(&[wg("a")], &[wg("a")]).is_empty());
    }
}
