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

//! Cluster-state snapshot types consumed (never mutated) by both control
//! loops.
//!
//! `ClusterState` is an immutable snapshot, cheap to clone, in the same
//! spirit as the metadata snapshots handed to a control loop on every
//! cluster-state tick: callers copy out the fields they need rather than
//! retaining references across applier transitions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Namespace under which DSLC stamps per-index custom metadata.
pub const LIFECYCLE_METADATA_NAMESPACE: &str = "data_stream_lifecycle";
/// Key, within the namespace above, holding the force-merge completion
/// timestamp (milliseconds since epoch, stringified).
pub const FORCE_MERGE_COMPLETED_TIMESTAMP_KEY: &str = "force_merge_completed_timestamp";

/// A data stream's lifecycle spec. Downsampling is part of the upstream
/// model but is not acted on by this controller, so it is not modeled here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSpec {
    /// Retention window in milliseconds, if configured.
    pub data_retention_ms: Option<i64>,
}

/// Settings relevant to lifecycle decisions. Settings transport in general
/// is out of scope; only the fields DSLC actually reads are modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Name of a foreign (non-DSLC) lifecycle policy managing this index, if
    /// any. Its mere presence excludes the index from DSLC management.
    pub foreign_lifecycle_policy: Option<String>,
    pub merge_policy_floor_segment_bytes: Option<u64>,
    pub merge_policy_merge_factor: Option<u32>,
}

impl IndexSettings {
    pub fn matches_merge_policy(&self, floor_segment_bytes: u64, merge_factor: u32) -> bool {
        self.merge_policy_floor_segment_bytes == Some(floor_segment_bytes)
            && self.merge_policy_merge_factor == Some(merge_factor)
    }
}

/// One physical index backing a data stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingIndex {
    pub name: String,
    pub create_timestamp_ms: i64,
    pub settings: IndexSettings,
    /// Custom metadata, namespaced exactly like the upstream per-index
    /// metadata map (`namespace -> key -> value`).
    pub custom_metadata: HashMap<String, HashMap<String, String>>,
}

impl BackingIndex {
    pub fn for_test(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_timestamp_ms: 0,
            settings: IndexSettings::default(),
            custom_metadata: HashMap::new(),
        }
    }

    pub fn with_create_timestamp_ms(mut self, ts: i64) -> Self {
        self.create_timestamp_ms = ts;
        self
    }

    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_foreign_lifecycle_policy(mut self, policy: impl Into<String>) -> Self {
        self.settings.foreign_lifecycle_policy = Some(policy.into());
        self
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.create_timestamp_ms).max(0)
    }

    pub fn force_merge_completed_timestamp(&self) -> Option<i64> {
        self.custom_metadata
            .get(LIFECYCLE_METADATA_NAMESPACE)?
            .get(FORCE_MERGE_COMPLETED_TIMESTAMP_KEY)?
            .parse()
            .ok()
    }

    pub fn has_foreign_lifecycle_policy(&self) -> bool {
        self.settings.foreign_lifecycle_policy.is_some()
    }

    /// Returns a copy of this index with the force-merge completion
    /// timestamp stamped, preserving any other pre-existing entries in the
    /// namespace.
    pub fn with_force_merge_completed(&self, now_ms: i64) -> Self {
        let mut updated = self.clone();
        let namespace = updated
            .custom_metadata
            .entry(LIFECYCLE_METADATA_NAMESPACE.to_string())
            .or_default();
        namespace.insert(
            FORCE_MERGE_COMPLETED_TIMESTAMP_KEY.to_string(),
            now_ms.to_string(),
        );
        updated
    }
}

/// A named data stream: an ordered list of backing indices and an optional
/// lifecycle spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStream {
    pub name: String,
    pub backing_indices: Vec<BackingIndex>,
    pub lifecycle: Option<LifecycleSpec>,
}

impl DataStream {
    pub fn for_test(name: impl Into<String>, backing_indices: Vec<BackingIndex>) -> Self {
        Self {
            name: name.into(),
            backing_indices,
            lifecycle: Some(LifecycleSpec::default()),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Option<LifecycleSpec>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_retention_ms(mut self, retention_ms: i64) -> Self {
        self.lifecycle = Some(LifecycleSpec {
            data_retention_ms: Some(retention_ms),
        });
        self
    }

    /// The write index: the last backing index, if any.
    pub fn write_index(&self) -> Option<&BackingIndex> {
        self.backing_indices.last()
    }

    /// Backing indices other than the write index, in insertion order.
    pub fn non_write_indices(&self) -> impl Iterator<Item = &BackingIndex> {
        let last = self.backing_indices.len().saturating_sub(1);
        self.backing_indices.iter().take(last)
    }
}

/// Immutable cluster-state snapshot. Cheaply cloneable: the stream list and
/// the tombstone graveyard are both `Arc`-backed.
#[derive(Debug, Clone)]
pub struct ClusterState {
    data_streams: Arc<Vec<DataStream>>,
    tombstone_graveyard: Arc<HashSet<String>>,
}

impl ClusterState {
    pub fn new(data_streams: Vec<DataStream>, tombstone_graveyard: HashSet<String>) -> Self {
        Self {
            data_streams: Arc::new(data_streams),
            tombstone_graveyard: Arc::new(tombstone_graveyard),
        }
    }

    pub fn for_test(data_streams: Vec<DataStream>) -> Self {
        Self::new(data_streams, HashSet::new())
    }

    pub fn data_streams(&self) -> &[DataStream] {
        &self.data_streams
    }

    pub fn tombstone(&mut self, index: impl Into<String>) {
        Arc::make_mut(&mut self.tombstone_graveyard).insert(index.into());
    }

    pub fn is_tombstoned(&self, index: &str) -> bool {
        self.tombstone_graveyard.contains(index)
    }

    pub fn index_exists(&self, index: &str) -> bool {
        self.data_streams
            .iter()
            .any(|ds| ds.backing_indices.iter().any(|idx| idx.name == index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_index_is_last_backing_index() {
        let ds = DataStream::for_test(
            "ds",
            vec![
                BackingIndex::for_test("i1"),
                BackingIndex::for_test("i2"),
                BackingIndex::for_test("i3"),
            ],
        );
        assert_eq!(ds.write_index().unwrap().name, "i3");
        let non_write: Vec<_> = ds.non_write_indices().map(|i| i.name.as_str()).collect();
        assert_eq!(non_write, vec!["i1", "i2"]);
    }

    #[test]
    fn stamping_force_merge_preserves_other_entries() {
        let mut idx = BackingIndex::for_test("i1");
        idx.custom_metadata
            .entry(LIFECYCLE_METADATA_NAMESPACE.to_string())
            .or_default()
            .insert("unrelated_key".to_string(), "keep-me".to_string());

        let stamped = idx.with_force_merge_completed(12345);
        let namespace = &stamped.custom_metadata[LIFECYCLE_METADATA_NAMESPACE];
        assert_eq!(namespace["unrelated_key"], "keep-me");
        assert_eq!(namespace[FORCE_MERGE_COMPLETED_TIMESTAMP_KEY], "12345");
    }

    #[test]
    fn age_never_negative() {
        let idx = BackingIndex::for_test("i1").with_create_timestamp_ms(100);
        assert_eq!(idx.age_ms(50), 0);
        assert_eq!(idx.age_ms(150), 50);
    }

    #[test]
    fn backing_index_round_trips_through_json() {
        let idx = BackingIndex::for_test("i1")
            .with_create_timestamp_ms(42)
            .with_force_merge_completed(999);
        let json = serde_json::to_string(&idx).unwrap();
        let round_tripped: BackingIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(idx, round_tripped);
    }
}
