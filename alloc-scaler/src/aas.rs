// Copyright (C) 2026 Cluster Lifecycle Authors.
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

//! The adaptive allocation scaler's periodic control loop.
//!
//! A single recurring task on the Tokio runtime plays the role of a
//! generic executor's fixed-delay schedule; `scalers` and `last_stats` are
//! held behind an async mutex because cluster-change events and tick
//! callbacks may interleave and must serialize on the same lock, exactly
//! as the concurrency model requires.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use lifecycle_common::{Client, Clock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics::ALLOC_SCALER_METRICS;
use crate::model::DeploymentAssignment;
use crate::requests::{
    GetDeploymentStatsRequest, UpdateTrainedModelDeploymentRequest,
};
use crate::scaler::PerDeploymentScaler;
use crate::stats::Stats;

/// Periodic scheduler: polls deployment stats, feeds scalers, dispatches
/// allocation updates.
pub struct Aas<C> {
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
    client: Arc<C>,
    scalers: Arc<Mutex<HashMap<String, PerDeploymentScaler>>>,
    last_stats: Arc<Mutex<HashMap<(String, String), Stats>>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<C> Aas<C>
where
    C: Client<GetDeploymentStatsRequest> + Client<UpdateTrainedModelDeploymentRequest> + Send + Sync + 'static,
{
    pub fn new(poll_interval: Duration, clock: Arc<dyn Clock>, client: Arc<C>) -> Self {
        Self {
            poll_interval,
            clock,
            client,
            scalers: Arc::new(Mutex::new(HashMap::new())),
            last_stats: Arc::new(Mutex::new(HashMap::new())),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    /// For each assignment whose adaptive-allocations block is present and
    /// enabled, ensures a scaler exists (creating it with
    /// `total_target_allocations` and the assignment's bounds). Assignments
    /// lacking or disabling adaptive allocations cause the corresponding
    /// scaler to be removed.
    pub async fn reconcile(&self, assignments: &[DeploymentAssignment]) {
        let mut scalers = self.scalers.lock().await;
        let mut seen = HashSet::new();
        for assignment in assignments {
            if !assignment.is_adaptive() {
                continue;
            }
            seen.insert(assignment.deployment_id.clone());
            let adaptive = assignment
                .adaptive_allocations
                .as_ref()
                .expect("is_adaptive implies adaptive_allocations is Some");
            let scaler = scalers.entry(assignment.deployment_id.clone()).or_insert_with(|| {
                PerDeploymentScaler::new(
                    assignment.deployment_id.clone(),
                    assignment.total_target_allocations,
                )
            });
            scaler.set_bounds(adaptive.min_allocations, adaptive.max_allocations);
        }
        scalers.retain(|id, _| seen.contains(id));
        ALLOC_SCALER_METRICS.active_scalers.set(scalers.len() as i64);
    }

    pub async fn start(self: &Arc<Self>, assignments: &[DeploymentAssignment]) {
        self.reconcile(assignments).await;
        if !self.scalers.lock().await.is_empty() {
            self.ensure_ticking().await;
        }
    }

    pub async fn cluster_changed(self: &Arc<Self>, assignments: &[DeploymentAssignment]) {
        self.reconcile(assignments).await;
        if self.scalers.lock().await.is_empty() {
            self.stop().await;
        } else {
            self.ensure_ticking().await;
        }
    }

    /// Cancels the periodic schedule. Idempotent: calling `stop` twice, or
    /// on a scaler that was never started, is a no-op.
    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
    }

    async fn ensure_ticking(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            return;
        }
        let this = Arc::clone(self);
        let interval = self.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            loop {
                ticks.tick().await;
                this.trigger().await;
            }
        });
        *ticker = Some(handle);
    }

    /// One tick: stats request, per-node delta, per-deployment aggregate,
    /// scaler feed, optional scale request. Failures at any step are
    /// logged; the next tick retries. No backoff: the poll interval alone
    /// throttles retries.
    pub async fn trigger(&self) {
        ALLOC_SCALER_METRICS.ticks_total.inc();

        let deployment_ids: Vec<String> = {
            let scalers = self.scalers.lock().await;
            scalers.keys().cloned().collect()
        };
        if deployment_ids.is_empty() {
            return;
        }

        let request =
            GetDeploymentStatsRequest::for_deployments(deployment_ids.iter().map(String::as_str));
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                ALLOC_SCALER_METRICS.stats_request_failures_total.inc();
                warn!(error = %err, "GetDeploymentStats failed, next tick retries");
                return;
            }
        };

        let mut per_deployment_recent: HashMap<String, Stats> = HashMap::new();
        {
            let mut last_stats = self.last_stats.lock().await;
            for node in &response.nodes {
                let current = Stats::new(
                    node.success_count,
                    node.pending_count,
                    node.error_count,
                    node.timeout_count,
                    node.rejection_count,
                    node.avg_inference_time_ms,
                );
                let key = (node.deployment_id.clone(), node.node_id.clone());
                let recent = match last_stats.get(&key) {
                    Some(prior) => current.sub(prior),
                    None => current,
                };
                last_stats.insert(key, current);

                per_deployment_recent
                    .entry(node.deployment_id.clone())
                    .and_modify(|acc| *acc = acc.add(&recent))
                    .or_insert(recent);
            }
        }

        let interval_seconds = self.poll_interval.as_secs_f64();
        let mut dispatches = Vec::new();
        {
            let mut scalers = self.scalers.lock().await;
            for (deployment_id, recent) in per_deployment_recent {
                let Some(scaler) = scalers.get_mut(&deployment_id) else {
                    // Removed by a reconcile that raced with this tick.
                    continue;
                };
                let observed_allocations = scaler.current_allocations;
                scaler.process(&recent, interval_seconds, observed_allocations);
                if let Some(new_count) = scaler.scale() {
                    debug!(deployment = %deployment_id, new_count, "scaling deployment");
                    scaler.current_allocations = new_count;
                    dispatches.push(UpdateTrainedModelDeploymentRequest {
                        deployment_id: deployment_id.clone(),
                        number_of_allocations: new_count,
                    });
                }
            }
        }

        for request in dispatches {
            let client = Arc::clone(&self.client);
            let deployment_id = request.deployment_id.clone();
            ALLOC_SCALER_METRICS.scale_requests_total.inc();
            info!(deployment = %deployment_id, count = request.number_of_allocations, "dispatching allocation update");
            tokio::spawn(async move {
                if let Err(err) = client.execute(request).await {
                    warn!(deployment = %deployment_id, error = %err, "UpdateTrainedModelDeployment failed");
                }
            });
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
