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

//! Data stream lifecycle controller: rollover, merge-policy adjustment,
//! force-merge and retention-delete for managed data streams.

pub mod dslc;
pub mod force_merge_task;
pub mod metrics;
pub mod requests;

#[cfg(any(test, feature = "testsuite"))]
pub mod test_support;

pub use dslc::Dslc;
pub use force_merge_task::{ClusterStateUpdateSink, UpdateForceMergeCompleteTask};
pub use requests::{
    DeleteIndexRequest, DeleteIndexResponse, ForceMergeRequest, ForceMergeRequestKey,
    ForceMergeResponse, RolloverRequest, RolloverResponse, UpdateSettingsRequest,
    UpdateSettingsResponse,
};
