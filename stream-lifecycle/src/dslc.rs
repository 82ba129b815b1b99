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

//! The data stream lifecycle controller's main loop.
//!
//! `run` is invoked by the cluster-state applier on every state change. It
//! never awaits: every outbound action is registered with the relevant
//! deduplicator and its dispatch (and eventual bookkeeping) happens on a
//! spawned task, matching the "fire-and-forget per node" shape of the
//! teacher's physical plan dispatch.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use lifecycle_common::{
    ActionDeduplicator, Client, ClusterState, DataStream, DedupOutcome, ErrorStore, LifecycleConfig,
    LifecycleSpec,
};
use tracing::{debug, info, warn};

use crate::force_merge_task::{ClusterStateUpdateSink, UpdateForceMergeCompleteTask};
use crate::metrics::STREAM_LIFECYCLE_METRICS;
use crate::requests::{
    DeleteIndexRequest, DeleteIndexResponse, ForceMergeRequest, ForceMergeRequestKey,
    ForceMergeResponse, RolloverRequest, RolloverResponse, UpdateSettingsRequest,
    UpdateSettingsResponse,
};

/// Orchestrates per-data-stream lifecycle on each cluster-state tick.
///
/// Generic over the client implementation so tests can supply a recording
/// double while production wires in the real transport; `C` must know how
/// to dispatch all four outbound request types.
pub struct Dslc<C, S> {
    config: LifecycleConfig,
    clock: Arc<dyn lifecycle_common::Clock>,
    client: Arc<C>,
    update_sink: Arc<S>,
    error_store: Arc<ErrorStore>,
    is_master: Arc<AtomicBool>,
    rolled_over_write_index: Arc<Mutex<HashMap<String, String>>>,
    rollover_dedup: Arc<ActionDeduplicator<RolloverRequest, RolloverResponse>>,
    delete_dedup: Arc<ActionDeduplicator<DeleteIndexRequest, DeleteIndexResponse>>,
    settings_dedup: Arc<ActionDeduplicator<UpdateSettingsRequest, UpdateSettingsResponse>>,
    force_merge_dedup: Arc<ActionDeduplicator<ForceMergeRequestKey, ForceMergeResponse>>,
}

impl<C, S> Dslc<C, S>
where
    C: Client<RolloverRequest>
        + Client<DeleteIndexRequest>
        + Client<UpdateSettingsRequest>
        + Client<ForceMergeRequest>
        + Send
        + Sync
        + 'static,
    S: ClusterStateUpdateSink + Send + Sync + 'static,
{
    pub fn new(
        config: LifecycleConfig,
        clock: Arc<dyn lifecycle_common::Clock>,
        client: Arc<C>,
        update_sink: Arc<S>,
    ) -> Self {
        Self {
            config,
            clock,
            client,
            update_sink,
            error_store: Arc::new(ErrorStore::new()),
            is_master: Arc::new(AtomicBool::new(true)),
            rolled_over_write_index: Arc::new(Mutex::new(HashMap::new())),
            rollover_dedup: Arc::new(ActionDeduplicator::new("dslc_rollover")),
            delete_dedup: Arc::new(ActionDeduplicator::new("dslc_delete")),
            settings_dedup: Arc::new(ActionDeduplicator::new("dslc_update_settings")),
            force_merge_dedup: Arc::new(ActionDeduplicator::new("dslc_force_merge")),
        }
    }

    pub fn set_master(&self, is_master: bool) {
        self.is_master.store(is_master, Ordering::SeqCst);
    }

    pub fn error_store(&self) -> &ErrorStore {
        &self.error_store
    }

    /// Non-blocking: out-of-scope failures (non-master invocation) return
    /// immediately without side effects. Never suspends; every action it
    /// emits is dispatched on a spawned task.
    pub fn run(&self, state: &ClusterState) {
        if !self.is_master.load(Ordering::SeqCst) {
            debug!("run invoked on non-master node, skipping");
            return;
        }

        // ErrorStore.reconcile scans every stored key regardless of which
        // stream it belongs to, so it must be called once with the managed
        // set unioned across *all* lifecycle-managed streams; reconciling
        // per-stream with only that stream's indices would make every other
        // managed stream's entries look unmanaged and wipe them.
        let mut managed: HashSet<String> = HashSet::new();
        for stream in state.data_streams() {
            if stream.lifecycle.is_none() {
                continue;
            }
            managed.extend(
                stream
                    .backing_indices
                    .iter()
                    .filter(|idx| !idx.has_foreign_lifecycle_policy())
                    .map(|idx| idx.name.clone()),
            );
        }
        self.error_store.reconcile(state, &managed);

        let mut managed_streams = 0u64;
        for stream in state.data_streams() {
            let Some(lifecycle) = stream.lifecycle.clone() else {
                continue;
            };
            managed_streams += 1;
            self.run_stream(stream, &lifecycle);
        }
        STREAM_LIFECYCLE_METRICS
            .managed_streams
            .set(managed_streams as i64);
    }

    fn run_stream(&self, stream: &DataStream, lifecycle: &LifecycleSpec) {
        let managed: HashSet<String> = stream
            .backing_indices
            .iter()
            .filter(|idx| !idx.has_foreign_lifecycle_policy())
            .map(|idx| idx.name.clone())
            .collect();

        let Some(write_index) = stream.write_index() else {
            return;
        };

        if managed.contains(&write_index.name) {
            self.maybe_rollover(stream, write_index, lifecycle);
        }

        for index in stream.non_write_indices() {
            if !managed.contains(&index.name) {
                continue;
            }
            if self.maybe_delete(stream, lifecycle, index) {
                continue;
            }
            if self.maybe_update_settings(index) {
                continue;
            }
            self.maybe_force_merge(index);
        }
    }

    fn maybe_rollover(
        &self,
        stream: &DataStream,
        write_index: &lifecycle_common::BackingIndex,
        lifecycle: &LifecycleSpec,
    ) {
        {
            let tracker = self.rolled_over_write_index.lock().expect("mutex poisoned");
            if tracker.get(&stream.name) == Some(&write_index.name) {
                return;
            }
        }

        let max_age = self.config.rollover_max_age(lifecycle.data_retention_ms);
        let request = RolloverRequest {
            data_stream: stream.name.clone(),
            max_age,
        };

        info!(stream = %stream.name, write_index = %write_index.name, ?max_age, "dispatching rollover");
        STREAM_LIFECYCLE_METRICS
            .requests_total
            .with_label_values(&["rollover"])
            .inc();

        let client = Arc::clone(&self.client);
        let error_store = Arc::clone(&self.error_store);
        let tracker = Arc::clone(&self.rolled_over_write_index);
        let stream_name = stream.name.clone();
        let write_index_name = write_index.name.clone();

        self.rollover_dedup.execute(
            request.clone(),
            move || async move { dispatch(client.as_ref(), request).await },
            Box::new(move |outcome| match outcome {
                DedupOutcome::Ok(_) => {
                    tracker
                        .lock()
                        .expect("mutex poisoned")
                        .insert(stream_name, write_index_name.clone());
                    error_store.clear(&write_index_name);
                }
                DedupOutcome::Err(err) => {
                    warn!(index = %write_index_name, error = %err, "rollover failed");
                    error_store.record(&write_index_name, err.to_string());
                }
            }),
        );
    }

    fn maybe_delete(
        &self,
        _stream: &DataStream,
        lifecycle: &LifecycleSpec,
        index: &lifecycle_common::BackingIndex,
    ) -> bool {
        let Some(retention_ms) = lifecycle.data_retention_ms else {
            return false;
        };
        if index.age_ms(self.clock.now_ms()) < retention_ms {
            return false;
        }

        let request = DeleteIndexRequest {
            index: index.name.clone(),
        };
        info!(index = %index.name, "dispatching delete-index for retention expiry");
        STREAM_LIFECYCLE_METRICS
            .requests_total
            .with_label_values(&["delete"])
            .inc();

        let client = Arc::clone(&self.client);
        let error_store = Arc::clone(&self.error_store);
        let index_name = index.name.clone();

        self.delete_dedup.execute(
            request.clone(),
            move || async move { dispatch(client.as_ref(), request).await },
            Box::new(move |outcome| {
                if let DedupOutcome::Err(err) = outcome {
                    warn!(index = %index_name, error = %err, "delete-index failed");
                    error_store.record(&index_name, err.to_string());
                }
            }),
        );
        true
    }

    fn maybe_update_settings(&self, index: &lifecycle_common::BackingIndex) -> bool {
        if index.settings.matches_merge_policy(
            self.config.merge_policy_floor_segment_bytes,
            self.config.merge_policy_merge_factor,
        ) {
            return false;
        }

        let request = UpdateSettingsRequest {
            index: index.name.clone(),
            floor_segment_bytes: self.config.merge_policy_floor_segment_bytes,
            merge_factor: self.config.merge_policy_merge_factor,
        };
        let floor_segment = byte_unit::Byte::from_bytes(self.config.merge_policy_floor_segment_bytes as u128)
            .get_appropriate_unit(true);
        info!(index = %index.name, %floor_segment, merge_factor = self.config.merge_policy_merge_factor, "dispatching merge-policy settings update");
        STREAM_LIFECYCLE_METRICS
            .requests_total
            .with_label_values(&["update_settings"])
            .inc();

        let client = Arc::clone(&self.client);
        let error_store = Arc::clone(&self.error_store);
        let index_name = index.name.clone();

        self.settings_dedup.execute(
            request.clone(),
            move || async move { dispatch(client.as_ref(), request).await },
            Box::new(move |outcome| {
                if let DedupOutcome::Err(err) = outcome {
                    warn!(index = %index_name, error = %err, "update-settings failed");
                    error_store.record(&index_name, err.to_string());
                }
            }),
        );
        true
    }

    fn maybe_force_merge(&self, index: &lifecycle_common::BackingIndex) {
        if index.force_merge_completed_timestamp().is_some() {
            return;
        }

        let request = ForceMergeRequest {
            indices: vec![index.name.clone()],
            only_expunge_deletes: false,
            flush: true,
            max_num_segments: Some(1),
            // Derived from the index name rather than a per-call counter: two
            // runs racing on the same index before the first resolves must
            // land on the same deduplicator key, or the dedup invariant
            // (§8.5 of the spec) is broken by construction.
            request_id: stable_request_id(&index.name),
            parent_task: None,
            store_result: false,
        };
        let key = ForceMergeRequestKey::new(request.clone());

        info!(index = %index.name, "dispatching force-merge");
        STREAM_LIFECYCLE_METRICS
            .requests_total
            .with_label_values(&["force_merge"])
            .inc();

        let client = Arc::clone(&self.client);
        let error_store = Arc::clone(&self.error_store);
        let update_sink = Arc::clone(&self.update_sink);
        let clock = Arc::clone(&self.clock);
        let index_name = index.name.clone();

        self.force_merge_dedup.execute(
            key,
            move || async move { dispatch(client.as_ref(), request).await },
            Box::new(move |outcome| match outcome {
                DedupOutcome::Ok(response) if response.is_complete_success() => {
                    STREAM_LIFECYCLE_METRICS.force_merge_completions_total.inc();
                    error_store.clear(&index_name);
                    let task = UpdateForceMergeCompleteTask::new(index_name.clone(), clock.now_ms());
                    let failure_index_name = index_name.clone();
                    tokio::spawn(async move {
                        if let Err(err) = update_sink.submit(task).await {
                            warn!(index = %failure_index_name, error = %err, "force-merge completion publish failed");
                        }
                    });
                }
                DedupOutcome::Ok(_) => {
                    STREAM_LIFECYCLE_METRICS.force_merge_failures_total.inc();
                    error_store.record(&index_name, "force-merge reported partial shard success");
                }
                DedupOutcome::Err(err) => {
                    STREAM_LIFECYCLE_METRICS.force_merge_failures_total.inc();
                    warn!(index = %index_name, error = %err, "force-merge failed");
                    error_store.record(&index_name, err.to_string());
                }
            }),
        );
    }
}

fn stable_request_id(index_name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    index_name.hash(&mut hasher);
    hasher.finish()
}

async fn dispatch<C, A>(client: &C, request: A) -> DedupOutcome<A::Response>
where
    C: Client<A>,
    A: lifecycle_common::Action,
    A::Response: Clone,
{
    match client.execute(request).await {
        Ok(response) => DedupOutcome::Ok(response),
        Err(err) => DedupOutcome::Err(Arc::new(err)),
    }
}
