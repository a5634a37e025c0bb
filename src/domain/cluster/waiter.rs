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

//! Operation waiter.
//!
//! Polls the cluster until an asynchronous backend operation settles. The
//! delay between polls grows exponentially; once the next poll would land past
//! the condition's threshold the waiter switches to a short fixed interval so
//! that it never oversleeps the deadline.
//!
//! Cancellation is checked between polls only. A poll that is already in
//! flight runs to completion, but no new poll starts after cancellation.

use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::config::WaiterConfig;
use crate::shared::error::{Result, ShootError};
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Target state of a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Every condition of a freshly created cluster reports "True".
    Ready,
    /// The last Create/Reconcile operation succeeded.
    Reconciled,
    /// The cluster is gone (the backend answers 404).
    Deleted,
}

/// Result of evaluating one poll.
#[derive(Debug)]
pub enum PollOutcome {
    Done(Option<ClusterObserved>),
    /// Not there yet; keep polling.
    Pending(String),
    Fatal(ShootError),
}

impl WaitCondition {
    pub fn evaluate(&self, polled: Result<ClusterObserved>) -> PollOutcome {
        match (self, polled) {
            (WaitCondition::Ready, Ok(observed)) => {
                if observed.is_ready() {
                    PollOutcome::Done(Some(observed))
                } else if observed.conditions.is_empty() {
                    PollOutcome::Pending("no conditions reported yet".to_string())
                } else {
                    let pending: Vec<String> = observed
                        .pending_conditions()
                        .iter()
                        .map(|c| format!("{}={}", c.condition_type, c.status))
                        .collect();
                    PollOutcome::Pending(format!("waiting on {}", pending.join(", ")))
                }
            }
            (WaitCondition::Ready, Err(e)) if e.is_not_found() => {
                PollOutcome::Pending("cluster not visible yet".to_string())
            }

            (WaitCondition::Reconciled, Ok(observed)) => {
                if observed.is_reconciled() {
                    PollOutcome::Done(Some(observed))
                } else {
                    let reason = match &observed.last_operation {
                        Some(op) => format!(
                            "last operation {} is {} ({}%)",
                            op.operation_type, op.state, op.progress
                        ),
                        None => "no operation reported yet".to_string(),
                    };
                    PollOutcome::Pending(reason)
                }
            }

            (WaitCondition::Deleted, Ok(_)) => {
                PollOutcome::Pending("cluster still exists".to_string())
            }
            (WaitCondition::Deleted, Err(e)) if e.is_not_found() => PollOutcome::Done(None),

            (_, Err(e)) => PollOutcome::Fatal(e),
        }
    }

    fn threshold(&self, config: &WaiterConfig) -> Duration {
        Duration::from_secs(match self {
            WaitCondition::Ready => config.ready_threshold_secs,
            WaitCondition::Reconciled => config.reconcile_threshold_secs,
            WaitCondition::Deleted => config.delete_threshold_secs,
        })
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WaitCondition::Ready => "ready",
            WaitCondition::Reconciled => "reconciled",
            WaitCondition::Deleted => "deleted",
        })
    }
}

/// Backoff parameters for one waiter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f32,
    pub jitter: bool,
    pub tightened_interval: Duration,
    pub threshold: Duration,
}

impl BackoffPolicy {
    pub fn new(config: &WaiterConfig, condition: WaitCondition) -> Self {
        Self {
            initial_interval: Duration::from_secs(config.initial_interval_secs),
            max_interval: Duration::from_secs(config.max_interval_secs),
            multiplier: config.multiplier,
            jitter: config.jitter,
            tightened_interval: Duration::from_secs(config.tightened_interval_secs),
            threshold: condition.threshold(config),
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_interval)
            .with_max_delay(self.max_interval)
            .with_factor(self.multiplier)
            .with_max_times(usize::MAX);
        if self.jitter {
            builder.with_jitter().build()
        } else {
            builder.build()
        }
    }

    fn tightened(&self) -> ExponentialBackoff {
        ExponentialBuilder::default()
            .with_min_delay(self.tightened_interval)
            .with_max_delay(self.tightened_interval)
            .with_factor(1.0)
            .with_max_times(usize::MAX)
            .build()
    }
}

/// Polls with adaptive backoff until a [`WaitCondition`] holds.
#[derive(Debug, Clone)]
pub struct OperationWaiter {
    config: WaiterConfig,
}

impl OperationWaiter {
    pub fn new(config: WaiterConfig) -> Self {
        Self { config }
    }

    /// Waiting budget for an operation timeout, minus the configured headroom.
    pub fn budget(&self, timeout: Duration) -> Duration {
        let headroom = Duration::from_secs(self.config.deadline_headroom_secs);
        if timeout > headroom {
            timeout - headroom
        } else {
            timeout
        }
    }

    /// Poll until `condition` holds, the budget runs out or `cancel` fires.
    ///
    /// Returns the last observed state for Ready/Reconciled and `None` for
    /// Deleted.
    pub async fn wait<F, Fut>(
        &self,
        condition: WaitCondition,
        budget: Duration,
        cancel: &CancellationToken,
        mut poll: F,
    ) -> Result<Option<ClusterObserved>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ClusterObserved>>,
    {
        let policy = BackoffPolicy::new(&self.config, condition);
        let started = Instant::now();
        let mut backoff = policy.backoff();
        let mut tightened = false;
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ShootError::Cancelled(format!(
                    "stopped waiting for cluster to be {} after {} polls",
                    condition, attempts
                )));
            }

            attempts += 1;
            let reason = match condition.evaluate(poll().await) {
                PollOutcome::Done(observed) => {
                    info!(%condition, attempts, elapsed = ?started.elapsed(), "wait finished");
                    return Ok(observed);
                }
                PollOutcome::Fatal(e) => return Err(e),
                PollOutcome::Pending(reason) => reason,
            };

            let elapsed = started.elapsed();
            let remaining = budget.saturating_sub(elapsed);
            if remaining.is_zero() {
                return Err(ShootError::DeadlineExceeded {
                    condition: condition.to_string(),
                    elapsed,
                    reason,
                });
            }

            let mut delay = backoff.next().unwrap_or(policy.max_interval);
            if !tightened && elapsed + delay >= policy.threshold {
                tightened = true;
                backoff = policy.tightened();
                delay = backoff.next().unwrap_or(policy.tightened_interval);
                debug!(%condition, ?elapsed, interval = ?delay, "tightening poll interval");
            }
            let delay = delay.min(remaining);

            debug!(%condition, attempts, ?elapsed, next = ?delay, %reason, "cluster not settled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    return Err(ShootError::Cancelled(format!(
                        "stopped waiting for cluster to be {} after {} polls",
                        condition, attempts
                    )));
                }
            }
        }
    }
}
