// Copyright 2025 The Carina Authors.
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

//! Waiting for a cluster to leave its in-progress states.
//!
//! After `create` or `rebuild` the backend keeps working on the cluster
//! asynchronously and offers no notification when it is done, so the only
//! option is to poll. The protocol is deliberately simple:
//!
//! 1. sleep a fixed grace period, since a freshly mutated cluster is almost
//!    certainly still initialising;
//! 2. while the status is `new`, `building` or `rebuilding-swarm`, sleep the
//!    poll interval and fetch the cluster again.
//!
//! Any other status ends the wait, including `error` and statuses this client
//! does not know about. A failed fetch ends it too and is returned as is.
//! Without a timeout the loop is unbounded.

use super::model::{Cluster, ClusterStatus};
use crate::infrastructure::api::ClusterClient;
use crate::infrastructure::constants::{POLL_INTERVAL, STARTUP_GRACE_PERIOD};
use crate::shared::error::{CarinaError, Result};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Timing of the wait loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub grace_period: Duration,
    pub poll_interval: Duration,
    /// Checked before every poll. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            grace_period: STARTUP_GRACE_PERIOD,
            poll_interval: POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl WaitPolicy {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }
}

pub struct ClusterReconciler<'a> {
    client: &'a dyn ClusterClient,
    policy: WaitPolicy,
}

impl<'a> ClusterReconciler<'a> {
    pub fn new(client: &'a dyn ClusterClient, policy: WaitPolicy) -> Self {
        Self { client, policy }
    }

    /// Settle the outcome of a mutating call.
    ///
    /// An error from the call is returned straight away. Otherwise the
    /// snapshot is returned as is when `wait` is false, or after polling
    /// reaches a terminal status when it is true.
    pub async fn reconcile(
        &self,
        name: &str,
        outcome: Result<Cluster>,
        wait: bool,
    ) -> Result<Cluster> {
        let cluster = outcome?;

        if !wait {
            return Ok(cluster);
        }

        self.wait_until_settled(name, cluster).await
    }

    pub async fn wait_until_settled(&self, name: &str, mut cluster: Cluster) -> Result<Cluster> {
        let started = Instant::now();

        info!(
            "Waiting for cluster {} (status: {}, first check in {:?})",
            name, cluster.status, self.policy.grace_period
        );
        sleep(self.policy.grace_period).await;

        while cluster.status.is_in_progress() {
            if let Some(timeout) = self.policy.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(CarinaError::Timeout {
                        cluster: name.to_string(),
                        status: cluster.status.to_string(),
                        waited,
                    });
                }
            }

            sleep(self.policy.poll_interval).await;
            cluster = self.client.get(name).await?;
            debug!("Cluster {} is {}", name, cluster.status);
        }

        if cluster.status == ClusterStatus::Error {
            warn!("Cluster {} finished in error state", name);
        } else {
            info!("Cluster {} is {}", name, cluster.status);
        }

        Ok(cluster)
    }
}
