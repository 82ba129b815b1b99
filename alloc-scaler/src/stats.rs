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

//! Per-`(deployment, node)` inference statistics and their delta
//! arithmetic.

/// A point-in-time (or delta) snapshot of inference load.
///
/// `avg_inference_time_seconds` is stored in seconds; callers translating
/// from a milliseconds-denominated wire response must divide by 1000
/// before constructing one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub success_count: u64,
    pub pending_count: u64,
    pub failed_count: u64,
    pub avg_inference_time_seconds: f64,
}

impl Stats {
    /// `failed_count` is the sum of errors, timeouts and rejections;
    /// `avg_inference_time_ms` arrives in milliseconds and is converted to
    /// seconds here.
    pub fn new(
        success_count: u64,
        pending_count: u64,
        errors: u64,
        timeouts: u64,
        rejections: u64,
        avg_inference_time_ms: f64,
    ) -> Self {
        Self {
            success_count,
            pending_count,
            failed_count: errors + timeouts + rejections,
            avg_inference_time_seconds: avg_inference_time_ms / 1000.0,
        }
    }

    pub fn total_inference_time_seconds(&self) -> f64 {
        self.success_count as f64 * self.avg_inference_time_seconds
    }

    fn recompute_avg(success_count: u64, total_inference_time_seconds: f64) -> f64 {
        if success_count > 0 {
            total_inference_time_seconds / success_count as f64
        } else {
            f64::NAN
        }
    }

    /// Aggregate two snapshots (e.g. summing per-node deltas into a
    /// per-deployment total).
    pub fn add(&self, other: &Stats) -> Stats {
        let success_count = self.success_count + other.success_count;
        let total = self.total_inference_time_seconds() + other.total_inference_time_seconds();
        Stats {
            success_count,
            pending_count: self.pending_count + other.pending_count,
            failed_count: self.failed_count + other.failed_count,
            avg_inference_time_seconds: Self::recompute_avg(success_count, total),
        }
    }

    /// `self` is the current snapshot, `prior` the last one observed.
    ///
    /// Monotone-safe only when every counter in `self` is >= the
    /// corresponding counter in `prior`. On a counter reset (any counter
    /// decreasing, e.g. a node restart zeroing its counters) this returns
    /// `self` unchanged, i.e. treats `prior` as absent rather than
    /// producing a negative delta.
    pub fn sub(&self, prior: &Stats) -> Stats {
        if self.success_count < prior.success_count
            || self.pending_count < prior.pending_count
            || self.failed_count < prior.failed_count
        {
            return *self;
        }
        let success_count = self.success_count - prior.success_count;
        let total =
            self.total_inference_time_seconds() - prior.total_inference_time_seconds();
        Stats {
            success_count,
            pending_count: self.pending_count - prior.pending_count,
            failed_count: self.failed_count - prior.failed_count,
            avg_inference_time_seconds: Self::recompute_avg(success_count, total),
        }
    }

    pub fn has_no_load(&self) -> bool {
        self.success_count == 0 && self.pending_count == 0 && self.failed_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_divides_millis_into_seconds() {
        let stats = Stats::new(10, 0, 1, 0, 0, 2500.0);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.avg_inference_time_seconds, 2.5);
    }

    #[test]
    fn add_recomputes_weighted_average() {
        let a = Stats::new(10, 0, 0, 0, 0, 1000.0);
        let b = Stats::new(30, 0, 0, 0, 0, 3000.0);
        let sum = a.add(&b);
        assert_eq!(sum.success_count, 40);
        assert_eq!(sum.avg_inference_time_seconds, 2.5);
    }

    #[test]
    fn add_with_zero_total_success_yields_nan() {
        let a = Stats::default();
        let b = Stats::default();
        assert!(a.add(&b).avg_inference_time_seconds.is_nan());
    }

    #[test]
    fn sub_recovers_delta_for_monotone_counters() {
        let last = Stats::new(10, 2, 0, 0, 0, 1000.0);
        let current = Stats::new(25, 3, 1, 0, 0, 1200.0);
        let recent = current.sub(&last);
        assert_eq!(recent.success_count, 15);
        assert_eq!(recent.pending_count, 1);
        assert_eq!(recent.failed_count, 1);
    }

    #[test]
    fn sub_on_counter_reset_treats_prior_as_absent() {
        let last = Stats::new(100, 5, 0, 0, 0, 1000.0);
        let current = Stats::new(3, 1, 0, 0, 0, 500.0);
        let recent = current.sub(&last);
        assert_eq!(recent, current);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_then_sub_round_trips(
            a_success in 0u64..1000,
            a_pending in 0u64..1000,
            a_failed in 0u64..1000,
            a_avg_ms in 1.0f64..5000.0,
            b_success in 1u64..1000,
            b_pending in 0u64..1000,
            b_failed in 0u64..1000,
            b_avg_ms in 1.0f64..5000.0,
        ) {
            // a may have zero success_count (avg NaN); only assert the
            // round trip when a's average is itself finite, per the
            // invariant's own qualifier.
            let a = Stats::new(a_success, a_pending, a_failed, 0, 0, a_avg_ms);
            let b = Stats::new(b_success, b_pending, b_failed, 0, 0, b_avg_ms);
            let recovered = a.add(&b).sub(&b);

            prop_assert_eq!(recovered.success_count, a.success_count);
            prop_assert_eq!(recovered.pending_count, a.pending_count);
            prop_assert_eq!(recovered.failed_count, a.failed_count);
            if a.success_count > 0 {
                prop_assert!((recovered.avg_inference_time_seconds - a.avg_inference_time_seconds).abs() < 1e-6);
            } else {
                prop_assert!(recovered.avg_inference_time_seconds.is_nan());
            }
        }
    }
}
