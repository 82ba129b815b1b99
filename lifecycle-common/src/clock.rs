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

//! The `Clock` collaborator: both control loops need "now" but must never
//! call `SystemTime::now()` directly so that tests can advance time
//! deterministically.

use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current wall-clock time, in milliseconds since the epoch.
///
/// Implementations must be cheap and infallible: this is called on every
/// control-loop tick and every per-index decision.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Default `Clock` backed by the operating system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the epoch")
            .as_millis() as i64
    }
}

#[cfg(any(test, feature = "testsuite"))]
pub mod test_clock {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    /// A `Clock` whose value is set by the test, for deterministic scenarios.
    #[derive(Debug, Default)]
    pub struct FixedClock(AtomicI64);

    impl FixedClock {
        pub fn new(now_ms: i64) -> Self {
            Self(AtomicI64::new(now_ms))
        }

        pub fn advance(&self, delta_ms: i64) {
            self.0.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
