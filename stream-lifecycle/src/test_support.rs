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

//! Test doubles shared between inline unit tests and the scenario
//! integration tests under `tests/`. Gated behind `testsuite` so external
//! integration tests can enable it without pulling fakes into production
//! builds, mirroring the teacher's `cfg!(any(test, feature = "testsuite"))`
//! gate on its own test-only constants.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lifecycle_common::{Client, LifecycleError};

use crate::force_merge_task::{ClusterStateUpdateSink, UpdateForceMergeCompleteTask};
use crate::requests::{
    DeleteIndexRequest, DeleteIndexResponse, ForceMergeRequest, ForceMergeResponse,
    RolloverRequest, RolloverResponse, UpdateSettingsRequest, UpdateSettingsResponse,
};

/// A single client double that can dispatch all four outbound request
/// types `Dslc` needs. Responses are queued per logical subject (data
/// stream name for rollover, index name otherwise) so that scenarios
/// involving several indices don't depend on dispatch interleaving.
#[derive(Default)]
pub struct FakeClient {
    rollover: Mutex<HashMap<String, VecDeque<Result<RolloverResponse, String>>>>,
    delete: Mutex<HashMap<String, VecDeque<Result<DeleteIndexResponse, String>>>>,
    settings: Mutex<HashMap<String, VecDeque<Result<UpdateSettingsResponse, String>>>>,
    force_merge: Mutex<HashMap<String, VecDeque<Result<ForceMergeResponse, String>>>>,

    rollover_requests: Mutex<Vec<RolloverRequest>>,
    delete_requests: Mutex<Vec<DeleteIndexRequest>>,
    settings_requests: Mutex<Vec<UpdateSettingsRequest>>,
    force_merge_requests: Mutex<Vec<ForceMergeRequest>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_rollover_ok(&self, stream: &str) {
        self.rollover
            .lock()
            .unwrap()
            .entry(stream.to_string())
            .or_default()
            .push_back(Ok(RolloverResponse { rolled_over: true }));
    }

    pub fn push_delete_ok(&self, index: &str) {
        self.delete
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push_back(Ok(DeleteIndexResponse));
    }

    pub fn push_settings_ok(&self, index: &str) {
        self.settings
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push_back(Ok(UpdateSettingsResponse));
    }

    pub fn push_force_merge_success(&self, index: &str) {
        self.force_merge
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push_back(Ok(ForceMergeResponse {
                total_shards: 1,
                successful_shards: 1,
                failed_shards: 0,
            }));
    }

    pub fn push_force_merge_partial_failure(&self, index: &str) {
        self.force_merge
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push_back(Ok(ForceMergeResponse {
                total_shards: 1,
                successful_shards: 0,
                failed_shards: 1,
            }));
    }

    pub fn push_force_merge_error(&self, index: &str) {
        self.force_merge
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push_back(Err("force-merge rejected".to_string()));
    }

    pub fn rollover_requests(&self) -> Vec<RolloverRequest> {
        self.rollover_requests.lock().unwrap().clone()
    }

    pub fn delete_requests(&self) -> Vec<DeleteIndexRequest> {
        self.delete_requests.lock().unwrap().clone()
    }

    pub fn settings_requests(&self) -> Vec<UpdateSettingsRequest> {
        self.settings_requests.lock().unwrap().clone()
    }

    pub fn force_merge_request_count(&self) -> usize {
        self.force_merge_requests.lock().unwrap().len()
    }

    pub fn total_request_count(&self) -> usize {
        self.rollover_requests.lock().unwrap().len()
            + self.delete_requests.lock().unwrap().len()
            + self.settings_requests.lock().unwrap().len()
            + self.force_merge_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Client<RolloverRequest> for FakeClient {
    async fn execute(&self, request: RolloverRequest) -> Result<RolloverResponse, LifecycleError> {
        self.rollover_requests.lock().unwrap().push(request.clone());
        self.rollover
            .lock()
            .unwrap()
            .get_mut(&request.data_stream)
            .and_then(|q| q.pop_front())
            .expect("FakeClient rollover queue exhausted")
            .map_err(LifecycleError::client)
    }
}

#[async_trait]
impl Client<DeleteIndexRequest> for FakeClient {
    async fn execute(
        &self,
        request: DeleteIndexRequest,
    ) -> Result<DeleteIndexResponse, LifecycleError> {
        self.delete_requests.lock().unwrap().push(request.clone());
        self.delete
            .lock()
            .unwrap()
            .get_mut(&request.index)
            .and_then(|q| q.pop_front())
            .expect("FakeClient delete queue exhausted")
            .map_err(LifecycleError::client)
    }
}

#[async_trait]
impl Client<UpdateSettingsRequest> for FakeClient {
    async fn execute(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<UpdateSettingsResponse, LifecycleError> {
        self.settings_requests.lock().unwrap().push(request.clone());
        self.settings
            .lock()
            .unwrap()
            .get_mut(&request.index)
            .and_then(|q| q.pop_front())
            .expect("FakeClient settings queue exhausted")
            .map_err(LifecycleError::client)
    }
}

#[async_trait]
impl Client<ForceMergeRequest> for FakeClient {
    async fn execute(&self, request: ForceMergeRequest) -> Result<ForceMergeResponse, LifecycleError> {
        self.force_merge_requests.lock().unwrap().push(request.clone());
        let index = request.indices.first().cloned().unwrap_or_default();
        self.force_merge
            .lock()
            .unwrap()
            .get_mut(&index)
            .and_then(|q| q.pop_front())
            .expect("FakeClient force_merge queue exhausted")
            .map_err(LifecycleError::client)
    }
}

/// Always acknowledges force-merge completion publication successfully.
#[derive(Default)]
pub struct FakeUpdateSink {
    pub submitted: Mutex<Vec<UpdateForceMergeCompleteTask>>,
}

impl FakeUpdateSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn submitted_indices(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.index.clone())
            .collect()
    }
}

#[async_trait]
impl ClusterStateUpdateSink for FakeUpdateSink {
    async fn submit(&self, task: UpdateForceMergeCompleteTask) -> Result<(), LifecycleError> {
        self.submitted.lock().unwrap().push(task);
        Ok(())
    }
}
