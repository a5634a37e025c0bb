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

use crate::domain::cluster::differ::{self, WorkerGroupPlan};
use crate::domain::cluster::kubeconfig::GeneratedKubeconfig;
use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::cluster::profile::CloudProfile;
use crate::domain::cluster::spec::{ClusterRef, ClusterSpec, ClusterUpdate};
use crate::domain::cluster::validator::ClusterValidator;
use crate::domain::cluster::waiter::{OperationWaiter, WaitCondition};
use crate::domain::config::{ProviderConfig, TimeoutConfig};
use crate::infrastructure::cleura::{ShootClusterClient, ShootClusterClientImpl};
use crate::shared::error::{ReconcileStep, Result, ShootError, StepContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything an update pass would change, computed without mutating anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub cluster_update: Option<ClusterUpdate>,
    pub worker_groups: WorkerGroupPlan,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.cluster_update.is_none() && self.worker_groups.is_empty()
    }
}

/// Result of binding to a cluster that already exists remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCluster {
    pub spec: ClusterSpec,
    pub observed: ClusterObserved,
}

/// Drives create/update/delete lifecycles of one shoot cluster at a time.
pub struct ShootClusterDescriptor {
    client: Arc<dyn ShootClusterClient>,
    validator: ClusterValidator,
    waiter: OperationWaiter,
    timeouts: TimeoutConfig,
}

impl ShootClusterDescriptor {
    pub fn new(client: Arc<dyn ShootClusterClient>, conf: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client,
            validator: ClusterValidator::new()?,
            waiter: OperationWaiter::new(conf.waiter.clone()),
            timeouts: conf.timeouts.clone(),
        })
    }

    /// Validate `conf` and connect to the configured API.
    pub async fn from_config(conf: &ProviderConfig) -> Result<Self> {
        conf.validate()?;
        let client = ShootClusterClientImpl::new(conf).await?;
        Self::new(Arc::new(client), conf)
    }

    pub fn validate(&self, spec: &ClusterSpec) -> Result<()> {
        self.validator.validate(spec)
    }

    /// Fill unset versions and zones, consulting the cloud profile only when needed.
    pub async fn resolve_spec(
        &self,
        spec: &ClusterSpec,
        observed: Option<&ClusterObserved>,
    ) -> Result<ClusterSpec> {
        if !spec.needs_resolution() {
            let mut resolved = spec.clone();
            resolved.maintenance = resolved.maintenance.with_defaults();
            return Ok(resolved);
        }

        let profile = self
            .client
            .resolve_cloud_profile(&spec.domain)
            .await
            .at(ReconcileStep::ResolveProfile)?;
        profile.resolve(spec, observed).at(ReconcileStep::ResolveProfile)
    }

    pub async fn create_cluster(
        &self,
        spec: &ClusterSpec,
        cancel: &CancellationToken,
    ) -> Result<ClusterObserved> {
        self.validate(spec)?;
        let deadline = Deadline::after(self.waiter.budget(self.timeouts.create()));
        let resolved = self.resolve_spec(spec, None).await?;
        self.validate(&resolved)?;

        let cluster = resolved.cluster_ref();
        ensure_active(cancel, &ReconcileStep::CreateCluster)?;
        info!(
            cluster = %cluster,
            kubernetes_version = ?resolved.kubernetes_version,
            worker_groups = resolved.worker_groups.len(),
            "creating shoot cluster"
        );

        let created = self
            .client
            .create_cluster(&resolved)
            .await
            .at(ReconcileStep::CreateCluster)?;
        let uid = created.uid.clone();

        let observed = self
            .wait(WaitCondition::Ready, &deadline, &cluster, cancel)
            .await
            .at(ReconcileStep::WaitReady)?
            .unwrap_or(created);

        info!(cluster = %cluster, uid = ?uid, "shoot cluster is ready");
        Ok(observed.preserve_uid(uid.as_deref()))
    }

    /// Converge the remote cluster towards `desired`.
    ///
    /// Cluster-level changes settle before any worker group is touched, and
    /// every worker-group mutation gets its own reconcile wait. The first
    /// failure aborts the pass; re-running it picks up from the remote state.
    pub async fn reconcile_cluster(
        &self,
        desired: &ClusterSpec,
        last_observed: Option<&ClusterObserved>,
        cancel: &CancellationToken,
    ) -> Result<ClusterObserved> {
        self.validate(desired)?;
        let cluster = desired.cluster_ref();
        let deadline = Deadline::after(self.waiter.budget(self.timeouts.update()));

        let current = self
            .client
            .fetch_cluster(&cluster)
            .await
            .at(ReconcileStep::FetchCluster)?;
        let mut uid = current
            .uid
            .clone()
            .or_else(|| last_observed.and_then(|o| o.uid.clone()));

        let resolved = self.resolve_spec(desired, Some(&current)).await?;
        self.validate(&resolved)?;

        let plan = compute_plan(&resolved, &current);
        if plan.is_empty() {
            info!(cluster = %cluster, "shoot cluster already up to date");
            return Ok(current.preserve_uid(uid.as_deref()));
        }

        if let Some(update) = &plan.cluster_update {
            ensure_active(cancel, &ReconcileStep::UpdateCluster)?;
            deadline.ensure_left(&ReconcileStep::UpdateCluster)?;
            info!(cluster = %cluster, fields = ?update.changed_fields(), "updating shoot cluster");
            let updated = self
                .client
                .update_cluster(&cluster, update)
                .await
                .at(ReconcileStep::UpdateCluster)?;
            uid = updated.uid.clone().or(uid);

            self.wait(WaitCondition::Reconciled, &deadline, &cluster, cancel)
                .await
                .at(ReconcileStep::WaitClusterReconciled)?;
        }

        let groups = &plan.worker_groups;

        for wg in &groups.to_modify {
            let step = ReconcileStep::ModifyWorkerGroup(wg.name.clone());
            ensure_active(cancel, &step)?;
            deadline.ensure_left(&step)?;
            info!(cluster = %cluster, worker_group = %wg.name, "modifying worker group");
            let updated = self
                .client
                .update_worker_group(&cluster, wg)
                .await
                .at(step)?;
            uid = updated.uid.clone().or(uid);
            self.wait_worker_group(&cluster, &wg.name, &deadline, cancel)
                .await?;
        }

        for wg in &groups.to_create {
            let step = ReconcileStep::CreateWorkerGroup(wg.name.clone());
            ensure_active(cancel, &step)?;
            deadline.ensure_left(&step)?;
            info!(cluster = %cluster, worker_group = %wg.name, "creating worker group");
            let updated = self
                .client
                .create_worker_group(&cluster, wg)
                .await
                .at(step)?;
            uid = updated.uid.clone().or(uid);
            self.wait_worker_group(&cluster, &wg.name, &deadline, cancel)
                .await?;
        }

        for wg in &groups.to_delete {
            let step = ReconcileStep::DeleteWorkerGroup(wg.name.clone());
            ensure_active(cancel, &step)?;
            deadline.ensure_left(&step)?;
            info!(cluster = %cluster, worker_group = %wg.name, "deleting worker group");
            let updated = self
                .client
                .delete_worker_group(&cluster, &wg.name)
                .await
                .at(step)?;
            uid = updated.uid.clone().or(uid);
            self.wait_worker_group(&cluster, &wg.name, &deadline, cancel)
                .await?;
        }

        let refreshed = self
            .client
            .fetch_cluster(&cluster)
            .await
            .at(ReconcileStep::FetchCluster)?;
        info!(cluster = %cluster, "shoot cluster reconciled");
        Ok(refreshed.preserve_uid(uid.as_deref()))
    }

    /// Dry run of [`reconcile_cluster`](Self::reconcile_cluster).
    pub async fn plan(&self, desired: &ClusterSpec) -> Result<ReconcilePlan> {
        self.validate(desired)?;
        let current = self
            .client
            .fetch_cluster(&desired.cluster_ref())
            .await
            .at(ReconcileStep::FetchCluster)?;
        let resolved = self.resolve_spec(desired, Some(&current)).await?;
        Ok(compute_plan(&resolved, &current))
    }

    /// Delete the cluster and wait until it is gone. A cluster that is
    /// already gone counts as deleted.
    pub async fn delete_cluster(
        &self,
        cluster: &ClusterRef,
        cancel: &CancellationToken,
    ) -> Result<()> {
        ensure_active(cancel, &ReconcileStep::DeleteCluster)?;
        let deadline = Deadline::after(self.waiter.budget(self.timeouts.delete()));
        info!(cluster = %cluster, "deleting shoot cluster");

        match self.client.delete_cluster(cluster).await {
            Ok(ack) => debug!(cluster = %cluster, response = %ack, "delete accepted"),
            Err(e) if e.is_not_found() => {
                info!(cluster = %cluster, "shoot cluster already absent");
                return Ok(());
            }
            Err(e) => return Err(e.at(ReconcileStep::DeleteCluster)),
        }

        self.wait(WaitCondition::Deleted, &deadline, cluster, cancel)
            .await
            .at(ReconcileStep::WaitDeleted)?;

        info!(cluster = %cluster, "shoot cluster deleted");
        Ok(())
    }

    /// Bind to an existing cluster given `domain,name,region,project`.
    pub async fn import_cluster(&self, id: &str) -> Result<ImportedCluster> {
        let cluster: ClusterRef = id.parse()?;
        let observed = self
            .client
            .fetch_cluster(&cluster)
            .await
            .at(ReconcileStep::FetchCluster)?;

        info!(cluster = %cluster, uid = ?observed.uid, "imported shoot cluster");
        Ok(ImportedCluster {
            spec: observed.to_spec(),
            observed,
        })
    }

    pub async fn get_cluster_status(&self, cluster: &ClusterRef) -> Result<ClusterObserved> {
        self.client
            .fetch_cluster(cluster)
            .await
            .at(ReconcileStep::FetchCluster)
    }

    pub async fn cloud_profile(&self, domain: &str, supported_only: bool) -> Result<CloudProfile> {
        let profile = self
            .client
            .resolve_cloud_profile(domain)
            .await
            .at(ReconcileStep::ResolveProfile)?;
        Ok(if supported_only {
            profile.supported_only()
        } else {
            profile
        })
    }

    pub async fn generate_kubeconfig(
        &self,
        cluster: &ClusterRef,
        duration: Duration,
    ) -> Result<GeneratedKubeconfig> {
        if duration.is_zero() {
            return Err(ShootError::validation("kubeconfig duration must be > 0"));
        }
        let config = self.client.generate_kubeconfig(cluster, duration).await?;
        Ok(GeneratedKubeconfig::new(
            cluster.clone(),
            config,
            duration.as_secs(),
        ))
    }

    async fn wait(
        &self,
        condition: WaitCondition,
        deadline: &Deadline,
        cluster: &ClusterRef,
        cancel: &CancellationToken,
    ) -> Result<Option<ClusterObserved>> {
        let budget = deadline.remaining();
        if budget.is_zero() {
            return Err(deadline.exceeded(&condition, "no time left to start waiting"));
        }
        debug!(cluster = %cluster, %condition, ?budget, "waiting");
        self.waiter
            .wait(condition, budget, cancel, || self.client.fetch_cluster(cluster))
            .await
    }

    async fn wait_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &str,
        deadline: &Deadline,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.wait(WaitCondition::Reconciled, deadline, cluster, cancel)
            .await
            .at(ReconcileStep::WaitWorkerGroupReconciled(
                worker_group.to_string(),
            ))?;
        Ok(())
    }
}

/// Cluster-level changes plus the worker-group diff between a resolved
/// desired state and the remote cluster.
pub fn compute_plan(desired: &ClusterSpec, observed: &ClusterObserved) -> ReconcilePlan {
    let update = cluster_update(desired, observed);
    ReconcilePlan {
        cluster_update: (!update.is_empty()).then_some(update),
        worker_groups: differ::diff(&desired.worker_groups, &observed.worker_groups),
    }
}

fn cluster_update(desired: &ClusterSpec, observed: &ClusterObserved) -> ClusterUpdate {
    let mut update = ClusterUpdate::default();

    if let Some(version) = &desired.kubernetes_version {
        if *version != observed.kubernetes_version {
            update.kubernetes_version = Some(version.clone());
        }
    }
    if desired.hibernation_schedules != observed.hibernation_schedules {
        update.hibernation_schedules = Some(desired.hibernation_schedules.clone());
    }
    let maintenance = desired.maintenance.with_defaults();
    if maintenance != observed.maintenance.with_defaults() {
        update.maintenance = Some(maintenance);
    }

    update
}

/// Time budget shared by every wait of one lifecycle operation.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            at: started + budget,
        }
    }

    fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    fn exceeded(&self, condition: &WaitCondition, reason: impl Into<String>) -> ShootError {
        ShootError::DeadlineExceeded {
            condition: condition.to_string(),
            elapsed: self.started.elapsed(),
            reason: reason.into(),
        }
    }

    /// A mutation is only issued while there is time left to wait for it.
    fn ensure_left(&self, step: &ReconcileStep) -> Result<()> {
        if self.remaining().is_zero() {
            return Err(self
                .exceeded(&WaitCondition::Reconciled, format!("no time left before {}", step))
                .at(step.clone()));
        }
        Ok(())
    }
}

fn ensure_active(cancel: &CancellationToken, step: &ReconcileStep) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ShootError::Cancelled(format!("before {}", step)));
    }
    Ok(())
}
