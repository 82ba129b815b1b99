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

//! The cluster-state update task that stamps a completed force-merge onto
//! an index's custom metadata, and the publication boundary it is
//! submitted through.
//!
//! Structured as a pure `state -> state` transform plus a separately
//! driven completion notification: `execute` itself never notifies a
//! listener, only the publication machinery behind [`ClusterStateUpdateSink`]
//! does, once the update is actually acknowledged.

use async_trait::async_trait;
use lifecycle_common::{BackingIndex, LifecycleError};

/// Stamps `data_stream_lifecycle.force_merge_completed_timestamp` on the
/// named index, preserving every other pre-existing entry in that
/// namespace.
#[derive(Debug, Clone)]
pub struct UpdateForceMergeCompleteTask {
    pub index: String,
    pub now_ms: i64,
}

impl UpdateForceMergeCompleteTask {
    pub fn new(index: impl Into<String>, now_ms: i64) -> Self {
        Self {
            index: index.into(),
            now_ms,
        }
    }

    /// Pure transform: produces the updated index metadata. Does not touch
    /// any listener; that is [`ClusterStateUpdateSink::submit`]'s job.
    pub fn execute(&self, index: &BackingIndex) -> BackingIndex {
        index.with_force_merge_completed(self.now_ms)
    }
}

/// Publication boundary for cluster-state update tasks.
///
/// `onFailure` in the source design maps to `Err` here; `onResponse` maps to
/// `Ok`. Exactly one of the two is produced per call, exactly once.
#[async_trait]
pub trait ClusterStateUpdateSink: Send + Sync {
    async fn submit(&self, task: UpdateForceMergeCompleteTask) -> Result<(), LifecycleError>;
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// Records every task submitted to it and always acknowledges
    /// successfully, unless primed to fail via `fail_next`.
    #[derive(Default)]
    pub struct RecordingUpdateSink {
        submitted: Mutex<Vec<UpdateForceMergeCompleteTask>>,
        fail_next: Mutex<bool>,
    }

    impl RecordingUpdateSink {
        pub fn submitted(&self) -> Vec<UpdateForceMergeCompleteTask> {
            self.submitted.lock().unwrap().clone()
        }

        pub fn fail_next(&self) {
            *self.fail_next.lock().unwrap() = true;
        }
    }

    #[async_trait]
    impl ClusterStateUpdateSink for RecordingUpdateSink {
        async fn submit(&self, task: UpdateForceMergeCompleteTask) -> Result<(), LifecycleError> {
            self.submitted.lock().unwrap().push(task);
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(LifecycleError::client("publish failed"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use lifecycle_common::cluster_state::LIFECYCLE_METADATA_NAMESPACE;

    use super::*;

    #[test]
    fn execute_preserves_other_entries() {
        let mut index = BackingIndex::for_test("i1");
        index
            .custom_metadata
            .entry(LIFECYCLE_METADATA_NAMESPACE.to_string())
            .or_default()
            .insert("other".to_string(), "value".to_string());

        let task = UpdateForceMergeCompleteTask::new("i1", 999);
        let updated = task.execute(&index);

        let namespace = &updated.custom_metadata[LIFECYCLE_METADATA_NAMESPACE];
        assert_eq!(namespace["other"], "value");
        assert_eq!(namespace["force_merge_completed_timestamp"], "999");
    }
}
