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

//! Outbound request/response types for the adaptive allocation scaler.

use lifecycle_common::Action;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetDeploymentStatsRequest {
    /// Comma-joined list of known deployment ids, matching the wire shape
    /// of the upstream stats endpoint.
    pub deployment_ids_csv: String,
}

impl GetDeploymentStatsRequest {
    pub fn for_deployments<'a>(deployment_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            deployment_ids_csv: deployment_ids.into_iter().collect::<Vec<_>>().join(","),
        }
    }
}

impl Action for GetDeploymentStatsRequest {
    type Response = GetDeploymentStatsResponse;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDeploymentStats {
    pub deployment_id: String,
    pub node_id: String,
    pub success_count: u64,
    pub pending_count: u64,
    pub error_count: u64,
    pub timeout_count: u64,
    pub rejection_count: u64,
    pub avg_inference_time_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetDeploymentStatsResponse {
    pub nodes: Vec<NodeDeploymentStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateTrainedModelDeploymentRequest {
    pub deployment_id: String,
    pub number_of_allocations: i32,
}

impl Action for UpdateTrainedModelDeploymentRequest {
    type Response = UpdateTrainedModelDeploymentResponse;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrainedModelDeploymentResponse;
