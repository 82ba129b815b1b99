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

//! Metrics for the adaptive allocation scaler's tick loop.

use lifecycle_common::metrics::{new_counter, new_gauge};
use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntGauge};

pub struct AllocScalerMetrics {
    pub ticks_total: IntCounter,
    pub stats_request_failures_total: IntCounter,
    pub scale_requests_total: IntCounter,
    pub active_scalers: IntGauge,
}

impl AllocScalerMetrics {
    fn new() -> Self {
        Self {
            ticks_total: new_counter(
                "alloc_scaler_ticks_total",
                "Number of adaptive allocation scaler ticks executed.",
                "alloc_scaler",
            ),
            stats_request_failures_total: new_counter(
                "alloc_scaler_stats_request_failures_total",
                "Number of GetDeploymentStats requests that failed.",
                "alloc_scaler",
            ),
            scale_requests_total: new_counter(
                "alloc_scaler_scale_requests_total",
                "Number of UpdateTrainedModelDeployment requests dispatched.",
                "alloc_scaler",
            ),
            active_scalers: new_gauge(
                "alloc_scaler_active_scalers",
                "Number of per-deployment scalers currently tracked.",
                "alloc_scaler",
            ),
        }
    }
}

pub static ALLOC_SCALER_METRICS: Lazy<AllocScalerMetrics> = Lazy::new(AllocScalerMetrics::new);
