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

// CLI command definitions

use super::shoot::{
    ApplyCommand, CreateCommand, DeleteCommand, GlobalArgs, ImportCommand, KubeconfigCommand,
    PlanCommand, ProfilesCommand, StatusCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shootctl",
    version,
    about = "Declarative management of Cleura shoot clusters",
    long_about = "Create, reconcile, import and delete Gardener shoot clusters and their worker groups through the Cleura REST API"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a new shoot cluster and wait until it is ready
    Create(CreateCommand),

    /// Reconcile an existing cluster towards the desired state
    Apply(ApplyCommand),

    /// Delete a cluster and wait until it is gone
    Delete(DeleteCommand),

    /// Bind to an existing cluster and record its state
    Import(ImportCommand),

    /// Show cluster status
    Status(StatusCommand),

    /// Show what apply would change, without changing anything
    Plan(PlanCommand),

    /// List Kubernetes and machine image versions of a cloud profile
    Profiles(ProfilesCommand),

    /// Generate a time-limited kubeconfig
    Kubeconfig(KubeconfigCommand),
}

impl Commands {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            Commands::Create(cmd) => cmd.execute(global).await,
            Commands::Apply(cmd) => cmd.execute(global).await,
            Commands::Delete(cmd) => cmd.execute(global).await,
            Commands::Import(cmd) => cmd.execute(global).await,
            Commands::Status(cmd) => cmd.execute(global).await,
            Commands::Plan(cmd) => cmd.execute(global).await,
            Commands::Profiles(cmd) => cmd.execute(global).await,
            Commands::Kubeconfig(cmd) => cmd.execute(global).await,
        }
    }
}
