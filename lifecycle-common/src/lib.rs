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

//! Shared primitives consumed by both cluster lifecycle control loops:
//! the data stream lifecycle controller and the adaptive allocation scaler.
//!
//! Everything here is a leaf: cluster-state snapshot types, the `Clock` and
//! `Client` collaborators, the error taxonomy, the action deduplicator, the
//! per-index error store, and loadable configuration.

pub mod client;
pub mod clock;
pub mod cluster_state;
pub mod config;
pub mod deduplicator;
pub mod error;
pub mod error_store;
pub mod metrics;

pub use client::{Action, Client};
pub use clock::{Clock, SystemClock};
pub use cluster_state::{BackingIndex, ClusterState, DataStream, IndexSettings, LifecycleSpec};
pub use config::LifecycleConfig;
pub use deduplicator::{ActionDeduplicator, DedupOutcome, Waiter};
pub use error::LifecycleError;
pub use error_store::ErrorStore;
