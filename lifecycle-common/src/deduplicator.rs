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

//! Collapses identical in-flight outbound requests into a single dispatch,
//! fanning the eventual result out to every caller that asked for it while
//! the original was still in flight.
//!
//! Modeled on the in-flight tracking idea behind a merge-operation inventory
//! that prevents a planner from resubmitting work it already has outstanding,
//! generalized here to fan the result out to every waiter instead of just
//! dropping duplicates.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::error::LifecycleError;
use crate::metrics::{GaugeGuard, LIFECYCLE_METRICS};

/// Outcome delivered to every caller coalesced onto the same key.
///
/// The error side is `Arc`-wrapped so the outcome can be cheaply cloned and
/// fanned out to every waiter without requiring `LifecycleError` itself to
/// implement `Clone`.
#[derive(Clone)]
pub enum DedupOutcome<R> {
    Ok(R),
    Err(Arc<LifecycleError>),
}

impl<R> DedupOutcome<R> {
    pub fn is_ok(&self) -> bool {
        matches!(self, DedupOutcome::Ok(_))
    }
}

pub type Waiter<R> = Box<dyn FnOnce(DedupOutcome<R>) + Send>;

/// Coalescing registry mapping a logical request key to a single in-flight
/// dispatch.
///
/// `execute` never blocks the caller: if the key is new, the action is
/// spawned on the current Tokio runtime and the entry is removed, and all
/// waiters notified, once it resolves. If the key already has an entry, the
/// new caller's `on_complete` is appended to the existing entry instead of
/// dispatching a second time.
pub struct ActionDeduplicator<K, R> {
    inflight: Mutex<HashMap<K, Vec<Waiter<R>>>>,
    loop_name: &'static str,
}

impl<K, R> ActionDeduplicator<K, R>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    /// `loop_name` labels this deduplicator's occupancy gauge, so several
    /// deduplicators (one per action kind) in the same process are
    /// distinguishable in the shared metric.
    pub fn new(loop_name: &'static str) -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            loop_name,
        }
    }

    /// Number of distinct keys currently in flight. Exposed for tests.
    pub fn len(&self) -> usize {
        self.inflight.lock().expect("dedup mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coalesce `key` onto any in-flight action already registered for it,
    /// or dispatch a fresh one via `action`.
    pub fn execute<F, Fut>(self: &Arc<Self>, key: K, action: F, on_complete: Waiter<R>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = DedupOutcome<R>> + Send + 'static,
    {
        let mut guard = self.inflight.lock().expect("dedup mutex poisoned");
        if let Some(waiters) = guard.get_mut(&key) {
            waiters.push(on_complete);
            return;
        }
        guard.insert(key.clone(), vec![on_complete]);
        drop(guard);

        let this = Arc::clone(self);
        let gauge = LIFECYCLE_METRICS
            .deduplicator_inflight_keys
            .with_label_values(&[this.loop_name]);
        tokio::spawn(async move {
            let _occupancy = GaugeGuard::acquire(gauge);
            let outcome = action().await;
            let waiters = {
                let mut guard = this.inflight.lock().expect("dedup mutex poisoned");
                guard.remove(&key).unwrap_or_default()
            };
            for waiter in waiters {
                waiter(outcome.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::{oneshot, Notify};

    use super::*;

    #[tokio::test]
    async fn concurrent_identical_keys_collapse_to_one_dispatch() {
        let dedup: Arc<ActionDeduplicator<&'static str, u32>> =
            Arc::new(ActionDeduplicator::new("test"));
        let dispatch_count = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();

        let count_for_action = Arc::clone(&dispatch_count);
        let gate_for_action = Arc::clone(&gate);
        dedup.execute(
            "k",
            move || async move {
                count_for_action.fetch_add(1, Ordering::SeqCst);
                gate_for_action.notified().await;
                DedupOutcome::Ok(7)
            },
            Box::new(move |outcome| {
                let _ = tx1.send(outcome.is_ok());
            }),
        );

        assert_eq!(dedup.len(), 1);

        dedup.execute(
            "k",
            move || async move {
                dispatch_count.fetch_add(1, Ordering::SeqCst);
                DedupOutcome::Ok(99)
            },
            Box::new(move |outcome| {
                let _ = tx2.send(outcome.is_ok());
            }),
        );

        assert_eq!(dedup.len(), 1, "second caller must coalesce, not dispatch again");

        gate.notify_one();
        assert!(rx1.await.unwrap());
        assert!(rx2.await.unwrap());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(dedup.len(), 0);
    }

    #[tokio::test]
    async fn distinct_keys_dispatch_independently() {
        let dedup: Arc<ActionDeduplicator<u32, u32>> = Arc::new(ActionDeduplicator::new("test"));
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();

        dedup.execute(
            1,
            || async { DedupOutcome::Ok(1) },
            Box::new(move |_| {
                let _ = tx_a.send(());
            }),
        );
        dedup.execute(
            2,
            || async { DedupOutcome::Ok(2) },
            Box::new(move |_| {
                let _ = tx_b.send(());
            }),
        );

        rx_a.await.unwrap();
        rx_b.await.unwrap();
    }
}
