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

use crate::cli::display::TableRenderer;
use crate::domain::cluster::descriptor::ShootClusterDescriptor;
use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::cluster::spec::{ClusterRef, ClusterSpec};
use crate::domain::config::{apply_to_provider_config, parse_dynamic_configs, ProviderConfig};
use crate::infrastructure::constants::{
    DEFAULT_GARDENER_DOMAIN, DEFAULT_KUBECONFIG_DURATION_SECS, DEFAULT_STATE_FILE,
};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Provider configuration file (TOML)
    ///
    /// Credentials can also come from CLEURA_API_HOST, CLEURA_API_USERNAME,
    /// CLEURA_API_TOKEN and CLEURA_API_PASSWORD.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Dynamic configuration properties to override any settings (-D key=value)
    ///
    /// API: api.host, api.username, api.token, api.password, api.request-timeout
    /// Timeouts (seconds): timeouts.create, timeouts.update, timeouts.delete, timeouts.all
    /// Waiter: waiter.initial-interval, waiter.max-interval, waiter.multiplier, waiter.jitter,
    /// waiter.tightened-interval, waiter.ready-threshold, waiter.reconcile-threshold,
    /// waiter.delete-threshold, waiter.deadline-headroom
    ///
    /// Example: -Dtimeouts.create=3600 -Dwaiter.jitter=false
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Defaults < config file < environment < -D overrides
    pub fn load_config(&self) -> anyhow::Result<ProviderConfig> {
        let mut conf = ProviderConfig::load(self.config.as_deref())?;

        if !self.properties.is_empty() {
            let overrides = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_provider_config(&overrides, &mut conf)?;
        }

        Ok(conf)
    }

    async fn descriptor(&self) -> anyhow::Result<ShootClusterDescriptor> {
        let conf = self.load_config()?;
        tracing::debug!(?conf, "provider configuration");
        Ok(ShootClusterDescriptor::from_config(&conf).await?)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// Desired cluster state (YAML, or TOML by extension)
    #[arg(long, short = 's', value_name = "FILE")]
    pub spec: PathBuf,

    /// Where the observed cluster state is recorded
    #[arg(long, default_value = DEFAULT_STATE_FILE, value_name = "FILE")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ApplyCommand {
    /// Desired cluster state (YAML, or TOML by extension)
    #[arg(long, short = 's', value_name = "FILE")]
    pub spec: PathBuf,

    /// Last observed state; updated after a successful pass
    #[arg(long, default_value = DEFAULT_STATE_FILE, value_name = "FILE")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// Cluster identifier: domain,name,region,project
    pub id: ClusterRef,

    /// State file to remove once the cluster is gone
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportCommand {
    /// Cluster identifier: domain,name,region,project
    pub id: String,

    #[arg(long, default_value = DEFAULT_STATE_FILE, value_name = "FILE")]
    pub state: PathBuf,

    /// Also write the reconstructed desired state as YAML
    #[arg(long, value_name = "FILE")]
    pub spec_output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// Cluster identifier: domain,name,region,project
    pub id: ClusterRef,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanCommand {
    /// Desired cluster state (YAML, or TOML by extension)
    #[arg(long, short = 's', value_name = "FILE")]
    pub spec: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ProfilesCommand {
    /// Gardener domain
    #[arg(long, default_value = DEFAULT_GARDENER_DOMAIN)]
    pub domain: String,

    /// Only list versions classified as supported
    #[arg(long)]
    pub supported_only: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct KubeconfigCommand {
    /// Cluster identifier: domain,name,region,project
    pub id: ClusterRef,

    /// Validity in seconds
    #[arg(long, default_value_t = DEFAULT_KUBECONFIG_DURATION_SECS)]
    pub duration: u64,

    /// Write the kubeconfig here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl CreateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let spec = ClusterSpec::from_file(&self.spec)?;
        let descriptor = global.descriptor().await?;
        let cancel = cancel_on_ctrl_c();

        let observed = descriptor.create_cluster(&spec, &cancel).await?;
        save_state(&self.state, &observed)?;

        println!("{}", TableRenderer::new().render_cluster_status(&observed));
        println!("Cluster {} created successfully!", spec.name);
        Ok(())
    }
}

impl ApplyCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let spec = ClusterSpec::from_file(&self.spec)?;
        let last = load_state(&self.state)?.filter(|o| {
            let same = o.cluster == spec.cluster_ref();
            if !same {
                tracing::warn!(
                    state = %self.state.display(),
                    recorded = %o.cluster,
                    "state file belongs to another cluster, ignoring it"
                );
            }
            same
        });

        let descriptor = global.descriptor().await?;
        let cancel = cancel_on_ctrl_c();

        let observed = descriptor
            .reconcile_cluster(&spec, last.as_ref(), &cancel)
            .await?;
        save_state(&self.state, &observed)?;

        println!("{}", TableRenderer::new().render_cluster_status(&observed));
        println!("Cluster {} reconciled successfully!", spec.name);
        Ok(())
    }
}

impl DeleteCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = global.descriptor().await?;
        let cancel = cancel_on_ctrl_c();

        descriptor.delete_cluster(&self.id, &cancel).await?;

        if let Some(state) = &self.state {
            if state.exists() {
                fs::remove_file(state)?;
            }
        }

        println!("Cluster {} deleted successfully!", self.id.name);
        Ok(())
    }
}

impl ImportCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        // Reject a malformed identifier before connecting.
        let cluster: ClusterRef = self.id.parse()?;
        let descriptor = global.descriptor().await?;

        let imported = descriptor.import_cluster(&self.id).await?;
        save_state(&self.state, &imported.observed)?;

        let yaml = serde_yaml::to_string(&imported.spec)?;
        match &self.spec_output {
            Some(path) => {
                fs::write(path, &yaml)?;
                println!("Desired state written to {}", path.display());
            }
            None => println!("{}", yaml),
        }

        println!("Cluster {} imported successfully!", cluster.name);
        Ok(())
    }
}

impl StatusCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = global.descriptor().await?;

        match descriptor.get_cluster_status(&self.id).await {
            Ok(observed) => {
                println!("{}", TableRenderer::new().render_cluster_status(&observed));
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                println!("Cluster {} no longer exists", self.id.name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl PlanCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let spec = ClusterSpec::from_file(&self.spec)?;
        let descriptor = global.descriptor().await?;

        let plan = descriptor.plan(&spec).await?;
        println!(
            "{}",
            TableRenderer::new().render_plan(&spec.cluster_ref(), &plan)
        );
        Ok(())
    }
}

impl ProfilesCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = global.descriptor().await?;

        let profile = descriptor
            .cloud_profile(&self.domain, self.supported_only)
            .await?;
        println!(
            "{}",
            TableRenderer::new().render_profile(&self.domain, &profile)
        );
        Ok(())
    }
}

impl KubeconfigCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = global.descriptor().await?;

        let kubeconfig = descriptor
            .generate_kubeconfig(&self.id, Duration::from_secs(self.duration))
            .await?;

        match &self.output {
            Some(path) => {
                fs::write(path, &kubeconfig.config)?;
                println!("Kubeconfig written to {}", path.display());
            }
            None => println!("{}", kubeconfig.config),
        }
        eprintln!(
            "Kubeconfig for {} expires at {}",
            self.id.name,
            kubeconfig.expires_at().to_rfc3339()
        );
        Ok(())
    }
}

/// Read a state file written by a previous run; a missing file means no state.
pub fn load_state(path: &Path) -> anyhow::Result<Option<ClusterObserved>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let observed = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse state file {}: {}", path.display(), e))?;
    Ok(Some(observed))
}

pub fn save_state(path: &Path, observed: &ClusterObserved) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(observed)?;
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Token cancelled on the first Ctrl-C. The waiter stops polling; a mutating
/// call already in flight still completes.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, stopping after the current call...");
            child.cancel();
        }
    });
    token
}
