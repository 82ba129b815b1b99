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

//! Outbound request/response types for the data stream lifecycle
//! controller, and the value-equality wrapper the deduplicator uses to
//! recognize two force-merge requests as logically the same.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use lifecycle_common::Action;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RolloverRequest {
    pub data_stream: String,
    pub max_age: Duration,
}

impl Action for RolloverRequest {
    type Response = RolloverResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverResponse {
    pub rolled_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteIndexRequest {
    pub index: String,
}

impl Action for DeleteIndexRequest {
    type Response = DeleteIndexResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIndexResponse;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateSettingsRequest {
    pub index: String,
    pub floor_segment_bytes: u64,
    pub merge_factor: u32,
}

impl Action for UpdateSettingsRequest {
    type Response = UpdateSettingsResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSettingsResponse;

/// A force-merge request. `parent_task` and `store_result` are carried for
/// observability / result retrieval but are explicitly excluded from the
/// logical-equality key below, so that retries issued by different
/// supervisory tasks still collapse onto the same deduplicator entry.
#[derive(Debug, Clone)]
pub struct ForceMergeRequest {
    pub indices: Vec<String>,
    pub only_expunge_deletes: bool,
    pub flush: bool,
    pub max_num_segments: Option<u32>,
    pub request_id: u64,
    pub parent_task: Option<String>,
    pub store_result: bool,
}

impl Action for ForceMergeRequest {
    type Response = ForceMergeResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceMergeResponse {
    pub total_shards: u32,
    pub successful_shards: u32,
    pub failed_shards: u32,
}

impl ForceMergeResponse {
    /// Completion criterion: every shard succeeded and none failed. Any
    /// other combination, including `successful_shards == total_shards`
    /// alongside a non-zero `failed_shards`, is treated as a transient
    /// failure rather than success-with-failure.
    pub fn is_complete_success(&self) -> bool {
        self.failed_shards == 0 && self.successful_shards == self.total_shards
    }
}

/// Value-equality wrapper over a [`ForceMergeRequest`] so the deduplicator
/// recognizes two requests as the same logical action even when their
/// `parent_task`/`store_result` differ.
#[derive(Debug, Clone)]
pub struct ForceMergeRequestKey {
    indices_sorted: Vec<String>,
    only_expunge_deletes: bool,
    flush: bool,
    max_num_segments: Option<u32>,
    request_id: u64,
    request: ForceMergeRequest,
}

impl ForceMergeRequestKey {
    pub fn new(request: ForceMergeRequest) -> Self {
        let mut indices_sorted = request.indices.clone();
        indices_sorted.sort();
        Self {
            indices_sorted,
            only_expunge_deletes: request.only_expunge_deletes,
            flush: request.flush,
            max_num_segments: request.max_num_segments,
            request_id: request.request_id,
            request,
        }
    }

    pub fn request(&self) -> &ForceMergeRequest {
        &self.request
    }

    pub fn into_request(self) -> ForceMergeRequest {
        self.request
    }
}

impl PartialEq for ForceMergeRequestKey {
    fn eq(&self, other: &Self) -> bool {
        self.indices_sorted == other.indices_sorted
            && self.only_expunge_deletes == other.only_expunge_deletes
            && self.flush == other.flush
            && self.max_num_segments == other.max_num_segments
            && self.request_id == other.request_id
    }
}

impl Eq for ForceMergeRequestKey {}

impl Hash for ForceMergeRequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indices_sorted.hash(state);
        self.only_expunge_deletes.hash(state);
        self.flush.hash(state);
        self.max_num_segments.hash(state);
        self.request_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(parent_task: Option<&str>, store_result: bool) -> ForceMergeRequest {
        ForceMergeRequest {
            indices: vec!["i2".to_string(), "i1".to_string()],
            only_expunge_deletes: false,
            flush: true,
            max_num_segments: Some(1),
            request_id: 42,
            parent_task: parent_task.map(|s| s.to_string()),
            store_result,
        }
    }

    #[test]
    fn equality_ignores_parent_task_and_store_result() {
        let a = ForceMergeRequestKey::new(sample(Some("task-a"), true));
        let b = ForceMergeRequestKey::new(sample(Some("task-b"), false));
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_indifferent_to_index_order() {
        let mut reordered = sample(None, false);
        reordered.indices = vec!["i1".to_string(), "i2".to_string()];
        let a = ForceMergeRequestKey::new(sample(None, false));
        let b = ForceMergeRequestKey::new(reordered);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_request_id() {
        let a = ForceMergeRequestKey::new(sample(None, false));
        let mut other = sample(None, false);
        other.request_id = 43;
        let b = ForceMergeRequestKey::new(other);
        assert_ne!(a, b);
    }

    #[test]
    fn partial_success_with_failures_is_not_complete() {
        let response = ForceMergeResponse {
            total_shards: 3,
            successful_shards: 3,
            failed_shards: 1,
        };
        assert!(!response.is_complete_success());
    }

    #[test]
    fn full_success_is_complete() {
        let response = ForceMergeResponse {
            total_shards: 3,
            successful_shards: 3,
            failed_shards: 0,
        };
        assert!(response.is_complete_success());
    }
}
