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

use proptest::prelude::*;
use shootctl::domain::cluster::{diff, WorkerGroupSpec};
use std::collections::{BTreeMap, BTreeSet};

/// Up to eight uniquely named groups, each with a small set of variants so
/// that equal names sometimes carry different settings.
fn groups() -> impl Strategy<Value = Vec<WorkerGroupSpec>> {
    prop::collection::btree_map("[a-h]", (1i64..3, 3i64..5), 0..8).prop_map(
        |by_name: BTreeMap<String, (i64, i64)>| {
            by_name
                .into_iter()
                .map(|(name, (min, max))| {
                    let mut wg = WorkerGroupSpec::new(name, "b.2c4gb");
                    wg.min_nodes = min;
                    wg.max_nodes = max;
                    wg
                })
                .collect()
        },
    )
}

fn names(groups: &[WorkerGroupSpec]) -> BTreeSet<String> {
    groups.iter().map(|g| g.name.clone()).collect()
}

proptest! {
    #[test]
    fn plan_partitions_names(desired in groups(), observed in groups()) {
        let plan = diff(&desired, &observed);
        let d = names(&desired);
        let o = names(&observed);

        let created = names(&plan.to_create);
        let deleted = names(&plan.to_delete);
        let modified = names(&plan.to_modify);

        let only_desired: BTreeSet<String> = d.difference(&o).cloned().collect();
        let only_observed: BTreeSet<String> = o.difference(&d).cloned().collect();
        let both: BTreeSet<String> = d.intersection(&o).cloned().collect();

        prop_assert_eq!(&created, &only_desired);
        prop_assert_eq!(&deleted, &only_observed);
        prop_assert!(modified.is_subset(&both));
        prop_assert!(created.is_disjoint(&deleted));
        prop_assert!(created.is_disjoint(&modified));
        prop_assert!(deleted.is_disjoint(&modified));
    }

    #[test]
    fn modified_groups_differ_from_observed(desired in groups(), observed in groups()) {
        let plan = diff(&desired, &observed);
        for wg in &plan.to_modify {
            let current = observed.iter().find(|o| o.name == wg.name);
            prop_assert!(current.is_some_and(|c| c != wg));
        }
        for wg in &desired {
            let current = observed.iter().find(|o| o.name == wg.name);
            if current == Some(wg) {
                prop_assert!(!plan.to_modify.iter().any(|m| m.name == wg.name));
            }
        }
    }

    #[test]
    fn applying_the_plan_converges(desired in groups(), observed in groups()) {
        let plan = diff(&desired, &observed);

        let mut applied = observed.clone();
        for wg in &plan.to_modify {
            if let Some(slot) = applied.iter_mut().find(|o| o.name == wg.name) {
                *slot = wg.clone();
            }
        }
        applied.extend(plan.to_create.iter().cloned());
        applied.retain(|o| !plan.to_delete.iter().any(|d| d.name == o.name));

        prop_assert!(diff(&desired, &applied).is_empty());
    }

    #[test]
    fn diff_is_deterministic(desired in groups(), observed in groups()) {
        prop_assert_eq!(diff(&desired, &observed), diff(&desired, &observed));
        prop_assert!(diff(&desired, &desired).is_empty());
    }
}
