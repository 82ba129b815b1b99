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

//! Thin wrappers over `prometheus` registration, shared by both crates'
//! metrics modules.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts};

pub fn new_counter(name: &str, help: &str, subsystem: &str) -> IntCounter {
    let counter = IntCounter::with_opts(Opts::new(name, help).subsystem(subsystem))
        .expect("invalid counter metric");
    prometheus::register(Box::new(counter.clone())).expect("failed to register counter");
    counter
}

pub fn new_counter_vec(name: &str, help: &str, subsystem: &str, labels: &[&str]) -> IntCounterVec {
    let counter_vec =
        IntCounterVec::new(Opts::new(name, help).subsystem(subsystem), labels)
            .expect("invalid counter_vec metric");
    prometheus::register(Box::new(counter_vec.clone())).expect("failed to register counter_vec");
    counter_vec
}

pub fn new_gauge(name: &str, help: &str, subsystem: &str) -> IntGauge {
    let gauge =
        IntGauge::with_opts(Opts::new(name, help).subsystem(subsystem)).expect("invalid gauge metric");
    prometheus::register(Box::new(gauge.clone())).expect("failed to register gauge");
    gauge
}

pub fn new_gauge_vec(name: &str, help: &str, subsystem: &str, labels: &[&str]) -> IntGaugeVec {
    let gauge_vec =
        IntGaugeVec::new(Opts::new(name, help).subsystem(subsystem), labels).expect("invalid gauge_vec metric");
    prometheus::register(Box::new(gauge_vec.clone())).expect("failed to register gauge_vec");
    gauge_vec
}

pub fn new_histogram(name: &str, help: &str, subsystem: &str, buckets: Vec<f64>) -> Histogram {
    let histogram = Histogram::with_opts(
        HistogramOpts::new(name, help)
            .subsystem(subsystem)
            .buckets(buckets),
    )
    .expect("invalid histogram metric");
    prometheus::register(Box::new(histogram.clone())).expect("failed to register histogram");
    histogram
}

/// RAII guard that increments a gauge on construction and decrements it on
/// drop. Used to track the number of in-flight deduplicated actions without
/// having to remember to decrement on every exit path. `IntGauge` is a thin
/// `Arc`-backed handle, so the guard owns a clone rather than borrowing.
pub struct GaugeGuard {
    gauge: IntGauge,
}

impl GaugeGuard {
    pub fn acquire(gauge: IntGauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

pub static LIFECYCLE_METRICS: Lazy<CommonMetrics> = Lazy::new(CommonMetrics::new);

/// Metrics not tied to a single crate's phase breakdown: deduplicator
/// occupancy, shared across both control loops.
pub struct CommonMetrics {
    pub deduplicator_inflight_keys: IntGaugeVec,
}

impl CommonMetrics {
    fn new() -> Self {
        Self {
            deduplicator_inflight_keys: new_gauge_vec(
                "deduplicator_inflight_keys",
                "Number of distinct logical keys currently coalesced in an action deduplicator.",
                "lifecycle",
                &["loop_name"],
            ),
        }
    }
}
