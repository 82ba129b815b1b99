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

//! Test doubles for the adaptive allocation scaler, shared between inline
//! unit tests and the scenario integration tests under `tests/`.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use lifecycle_common::{Client, LifecycleError};

use crate::requests::{
    GetDeploymentStatsRequest, GetDeploymentStatsResponse, UpdateTrainedModelDeploymentRequest,
    UpdateTrainedModelDeploymentResponse,
};

/// Stats responses are queued as a flat FIFO (one `GetDeploymentStats` call
/// covers every tracked deployment at once, so there is no per-subject key
/// to split on). Allocation-update responses are keyed by deployment id
/// since several may be dispatched concurrently within one tick.
#[derive(Default)]
pub struct FakeClient {
    stats: Mutex<VecDeque<Result<GetDeploymentStatsResponse, String>>>,
    scale: Mutex<HashMap<String, VecDeque<Result<UpdateTrainedModelDeploymentResponse, String>>>>,

    stats_requests: Mutex<Vec<GetDeploymentStatsRequest>>,
    scale_requests: Mutex<Vec<UpdateTrainedModelDeploymentRequest>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stats(&self, response: GetDeploymentStatsResponse) {
        self.stats.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_stats_error(&self, message: &str) {
        self.stats.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn push_scale_ok(&self, deployment_id: &str) {
        self.scale
            .lock()
            .unwrap()
            .entry(deployment_id.to_string())
            .or_default()
            .push_back(Ok(UpdateTrainedModelDeploymentResponse));
    }

    pub fn stats_request_count(&self) -> usize {
        self.stats_requests.lock().unwrap().len()
    }

    pub fn scale_requests(&self) -> Vec<UpdateTrainedModelDeploymentRequest> {
        self.scale_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client<GetDeploymentStatsRequest> for FakeClient {
    async fn execute(
        &self,
        request: GetDeploymentStatsRequest,
    ) -> Result<GetDeploymentStatsResponse, LifecycleError> {
        self.stats_requests.lock().unwrap().push(request);
        self.stats
            .lock()
            .unwrap()
            .pop_front()
            .expect("FakeClient stats queue exhausted")
            .map_err(LifecycleError::client)
    }
}

#[async_trait]
impl Client<UpdateTrainedModelDeploymentRequest> for FakeClient {
    async fn execute(
        &self,
        request: UpdateTrainedModelDeploymentRequest,
    ) -> Result<UpdateTrainedModelDeploymentResponse, LifecycleError> {
        self.scale_requests.lock().unwrap().push(request.clone());
        self.scale
            .lock()
            .unwrap()
            .get_mut(&request.deployment_id)
            .and_then(|q| q.pop_front())
            .expect("FakeClient scale queue exhausted")
            .map_err(LifecycleError::client)
    }
}
