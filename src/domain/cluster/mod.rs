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

//! Shoot cluster domain: desired and observed state, planning, waiting and
//! lifecycle orchestration.

pub mod descriptor;
pub mod differ;
pub mod kubeconfig;
pub mod observed;
pub mod profile;
pub mod spec;
pub mod validator;
pub mod waiter;

pub use self::descriptor::{compute_plan, ImportedCluster, ReconcilePlan, ShootClusterDescriptor};
pub use self::differ::{diff, WorkerGroupPlan};
pub use self::kubeconfig::GeneratedKubeconfig;
pub use self::observed::ClusterObserved;
pub use self::profile::CloudProfile;
pub use self::spec::{
    ClusterRef, ClusterSpec, ClusterUpdate, HibernationSchedule, MaintenancePolicy, Taint,
    TaintEffect, WorkerGroupSpec,
};
pub use self::validator::ClusterValidator;
pub use self::waiter::{OperationWaiter, PollOutcome, WaitCondition};
