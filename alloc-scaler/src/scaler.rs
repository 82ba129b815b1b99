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

//! Stateful estimator deciding target allocation count from recent load.
//!
//! The estimator's internals are intentionally under-specified upstream;
//! this implements a deterministic Little's-law-style sizing rule (work
//! arriving per interval times average service time, divided by the
//! interval) that satisfies the required properties: min/max respected,
//! absent-on-no-change, and deterministic given its inputs and prior
//! state.

use crate::stats::Stats;

#[derive(Debug, Clone)]
pub struct PerDeploymentScaler {
    pub deployment_id: String,
    pub current_allocations: i32,
    pub min_allocations: Option<i32>,
    pub max_allocations: Option<i32>,
    last_recent: Option<Stats>,
    last_interval_seconds: f64,
}

impl PerDeploymentScaler {
    pub fn new(deployment_id: impl Into<String>, initial_allocations: i32) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            current_allocations: initial_allocations,
            min_allocations: None,
            max_allocations: None,
            last_recent: None,
            last_interval_seconds: 0.0,
        }
    }

    pub fn set_bounds(&mut self, min: Option<i32>, max: Option<i32>) {
        self.min_allocations = min;
        self.max_allocations = max;
    }

    /// Feeds one tick's worth of observations into the estimator. Does not
    /// itself decide on a new allocation count; call `scale()` for that.
    pub fn process(&mut self, recent: &Stats, interval_seconds: f64, observed_allocations: i32) {
        self.current_allocations = observed_allocations;
        self.last_recent = Some(*recent);
        self.last_interval_seconds = interval_seconds;
    }

    /// Returns a new target allocation count, or `None` if the estimator
    /// sees no reason to change. Callers must not send a no-op request
    /// when this returns `None`.
    pub fn scale(&mut self) -> Option<i32> {
        let recent = self.last_recent?;
        if recent.has_no_load() {
            return None;
        }

        let service_time_seconds = if recent.avg_inference_time_seconds.is_finite() {
            recent.avg_inference_time_seconds
        } else {
            0.0
        };
        let interval_seconds = self.last_interval_seconds.max(f64::EPSILON);
        let arrivals = (recent.success_count + recent.pending_count) as f64;
        let required = ((arrivals * service_time_seconds) / interval_seconds)
            .ceil()
            .max(1.0) as i32;

        let clamped = self.clamp(required);
        if clamped == self.current_allocations {
            None
        } else {
            Some(clamped)
        }
    }

    fn clamp(&self, value: i32) -> i32 {
        let mut clamped = value;
        if let Some(min) = self.min_allocations {
            clamped = clamped.max(min);
        }
        if let Some(max) = self.max_allocations {
            clamped = clamped.min(max);
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_load_yields_no_change() {
        let mut scaler = PerDeploymentScaler::new("dep", 2);
        scaler.process(&Stats::default(), 10.0, 2);
        assert_eq!(scaler.scale(), None);
    }

    #[test]
    fn clamps_to_max() {
        let mut scaler = PerDeploymentScaler::new("dep", 1);
        scaler.set_bounds(Some(1), Some(4));
        let recent = Stats::new(7, 0, 0, 0, 0, 1000.0);
        scaler.process(&recent, 1.0, 1);
        assert_eq!(scaler.scale(), Some(4));
    }

    #[test]
    fn clamps_to_min() {
        let mut scaler = PerDeploymentScaler::new("dep", 10);
        scaler.set_bounds(Some(3), Some(20));
        let recent = Stats::new(1, 0, 0, 0, 0, 10.0);
        scaler.process(&recent, 100.0, 10);
        assert_eq!(scaler.scale(), Some(3));
    }

    #[test]
    fn matching_current_allocations_yields_no_change() {
        let mut scaler = PerDeploymentScaler::new("dep", 4);
        scaler.set_bounds(Some(1), Some(4));
        let recent = Stats::new(7, 0, 0, 0, 0, 1000.0);
        scaler.process(&recent, 1.0, 4);
        assert_eq!(scaler.scale(), None);
    }
}
