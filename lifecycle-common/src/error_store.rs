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

//! Per-index transient error memory for the data stream lifecycle
//! controller.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::cluster_state::ClusterState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    pub occurrences: u64,
}

/// Mapping *index name → last error message + occurrence count*.
///
/// Entries are cleared lazily by `reconcile`, never proactively swept: an
/// index that stops erroring simply stops being touched until the next
/// reconcile drops it.
#[derive(Default)]
pub struct ErrorStore {
    entries: Mutex<HashMap<String, ErrorEntry>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert/overwrite: records the latest error, bumping the
    /// occurrence count.
    pub fn record(&self, index: &str, message: impl Into<String>) {
        let mut guard = self.entries.lock().expect("error store mutex poisoned");
        guard
            .entry(index.to_string())
            .and_modify(|entry| {
                entry.message = message.into();
                entry.occurrences += 1;
            })
            .or_insert_with(|| ErrorEntry {
                message: message.into(),
                occurrences: 1,
            });
    }

    pub fn clear(&self, index: &str) {
        self.entries
            .lock()
            .expect("error store mutex poisoned")
            .remove(index);
    }

    pub fn get(&self, index: &str) -> Option<ErrorEntry> {
        self.entries
            .lock()
            .expect("error store mutex poisoned")
            .get(index)
            .cloned()
    }

    /// Drop any stored entry whose index either (a) no longer exists in the
    /// cluster and is present in the tombstone graveyard, or (b) exists but
    /// is no longer in `managed_indices`.
    ///
    /// The write index of a stream is exempt from the graveyard rule even
    /// if every non-write index of the same stream was just deleted:
    /// `managed_indices` is expected to still list it when it remains
    /// managed, which is sufficient to protect its entry here.
    pub fn reconcile(&self, state: &ClusterState, managed_indices: &std::collections::HashSet<String>) {
        let mut guard = self.entries.lock().expect("error store mutex poisoned");
        guard.retain(|index, _| {
            let exists = state.index_exists(index);
            let tombstoned = state.is_tombstoned(index);
            if !exists && tombstoned {
                return false;
            }
            if exists && !managed_indices.contains(index) {
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_state::{BackingIndex, ClusterState, DataStream};

    #[test]
    fn record_overwrites_and_counts_occurrences() {
        let store = ErrorStore::new();
        store.record("i1", "first");
        store.record("i1", "second");
        let entry = store.get("i1").unwrap();
        assert_eq!(entry.message, "second");
        assert_eq!(entry.occurrences, 2);
    }

    #[test]
    fn clear_removes_entry() {
        let store = ErrorStore::new();
        store.record("i1", "boom");
        store.clear("i1");
        assert!(store.get("i1").is_none());
    }

    #[test]
    fn reconcile_drops_tombstoned_deletions_but_keeps_managed() {
        let store = ErrorStore::new();
        store.record("i1", "boom");
        store.record("i2", "boom");

        let ds = DataStream::for_test("ds", vec![BackingIndex::for_test("i2")]);
        let mut state = ClusterState::for_test(vec![ds]);
        state.tombstone("i1");

        let managed: std::collections::HashSet<String> = ["i2".to_string()].into_iter().collect();
        store.reconcile(&state, &managed);

        assert!(store.get("i1").is_none(), "deleted + tombstoned index must be cleared");
        assert!(store.get("i2").is_some(), "managed index must be kept");
    }

    #[test]
    fn reconcile_drops_unmanaged_existing_index() {
        let store = ErrorStore::new();
        store.record("i1", "boom");

        let ds = DataStream::for_test("ds", vec![BackingIndex::for_test("i1")]);
        let state = ClusterState::for_test(vec![ds]);
        let managed: std::collections::HashSet<String> = std::collections::HashSet::new();

        store.reconcile(&state, &managed);
        assert!(store.get("i1").is_none());
    }
}
