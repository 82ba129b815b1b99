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

//! Per-phase action counters for the data stream lifecycle controller,
//! registered once behind a `Lazy` static, mirroring the teacher's
//! per-crate metrics-struct-as-consumer pattern.

use lifecycle_common::metrics::{new_counter_vec, new_gauge};
use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, IntGauge};

pub struct StreamLifecycleMetrics {
    /// Outbound requests emitted, labeled by phase:
    /// `rollover` | `delete` | `update_settings` | `force_merge`.
    pub requests_total: IntCounterVec,
    pub force_merge_completions_total: prometheus::IntCounter,
    pub force_merge_failures_total: prometheus::IntCounter,
    pub managed_streams: IntGauge,
}

impl StreamLifecycleMetrics {
    fn new() -> Self {
        Self {
            requests_total: new_counter_vec(
                "stream_lifecycle_requests_total",
                "Outbound requests emitted by the data stream lifecycle controller, by phase.",
                "stream_lifecycle",
                &["phase"],
            ),
            force_merge_completions_total: lifecycle_common::metrics::new_counter(
                "stream_lifecycle_force_merge_completions_total",
                "Force-merge operations that reached the completion criterion.",
                "stream_lifecycle",
            ),
            force_merge_failures_total: lifecycle_common::metrics::new_counter(
                "stream_lifecycle_force_merge_failures_total",
                "Force-merge operations that failed or reported partial success.",
                "stream_lifecycle",
            ),
            managed_streams: new_gauge(
                "stream_lifecycle_managed_streams",
                "Number of data streams with a non-null lifecycle observed on the last run.",
                "stream_lifecycle",
            ),
        }
    }
}

pub static STREAM_LIFECYCLE_METRICS: Lazy<StreamLifecycleMetrics> =
    Lazy::new(StreamLifecycleMetrics::new);
