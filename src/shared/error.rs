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

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShootError>;

#[derive(Error, Debug)]
pub enum ShootError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {resource_type} '{name}' in project '{project}'")]
    NotFound {
        resource_type: String,
        name: String,
        project: String,
    },

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Timed out after {elapsed:?} waiting for cluster to be {condition}: {reason}")]
    DeadlineExceeded {
        condition: String,
        elapsed: Duration,
        reason: String,
    },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("{step} failed: {source}")]
    Step {
        step: ReconcileStep,
        #[source]
        source: Box<ShootError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ShootError {
    pub fn validation(context: impl Into<String>) -> Self {
        Self::Validation(context.into())
    }

    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            project: project.into(),
        }
    }

    /// Attach the lifecycle step that produced this error.
    pub fn at(self, step: ReconcileStep) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }

    /// True for a 404, looking through any step context.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api { status, .. } => *status == 404,
            Self::Step { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Step { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Self::DeadlineExceeded { .. } => true,
            Self::Step { source, .. } => source.is_deadline_exceeded(),
            _ => false,
        }
    }

    /// The step that failed, if the error carries orchestrator context.
    pub fn step(&self) -> Option<&ReconcileStep> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Attach a [`ReconcileStep`] to the error side of a result.
pub trait StepContext<T> {
    fn at(self, step: ReconcileStep) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn at(self, step: ReconcileStep) -> Result<T> {
        self.map_err(|e| e.at(step))
    }
}

/// One mutating call or wait within a cluster lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStep {
    ResolveProfile,
    FetchCluster,
    CreateCluster,
    WaitReady,
    UpdateCluster,
    WaitClusterReconciled,
    ModifyWorkerGroup(String),
    CreateWorkerGroup(String),
    DeleteWorkerGroup(String),
    WaitWorkerGroupReconciled(String),
    DeleteCluster,
    WaitDeleted,
}

impl ReconcileStep {
    pub fn worker_group(&self) -> Option<&str> {
        match self {
            Self::ModifyWorkerGroup(name)
            | Self::CreateWorkerGroup(name)
            | Self::DeleteWorkerGroup(name)
            | Self::WaitWorkerGroupReconciled(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolveProfile => write!(f, "resolve cloud profile"),
            Self::FetchCluster => write!(f, "fetch cluster"),
            Self::CreateCluster => write!(f, "create cluster"),
            Self::WaitReady => write!(f, "wait for cluster ready"),
            Self::UpdateCluster => write!(f, "update cluster"),
            Self::WaitClusterReconciled => write!(f, "wait for cluster update to reconcile"),
            Self::ModifyWorkerGroup(name) => write!(f, "modify worker group '{}'", name),
            Self::CreateWorkerGroup(name) => write!(f, "create worker group '{}'", name),
            Self::DeleteWorkerGroup(name) => write!(f, "delete worker group '{}'", name),
            Self::WaitWorkerGroupReconciled(name) => {
                write!(f, "wait for worker group '{}' to reconcile", name)
            }
            Self::DeleteCluster => write!(f, "delete cluster"),
            Self::WaitDeleted => write!(f, "wait for cluster deletion"),
        }
    }
}
