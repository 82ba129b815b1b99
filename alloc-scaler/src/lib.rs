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

//! Adaptive allocation scaler: periodic control loop observing
//! per-deployment inference statistics and issuing allocation-count
//! updates.

pub mod aas;
pub mod metrics;
pub mod model;
pub mod requests;
pub mod scaler;
pub mod stats;

#[cfg(any(test, feature = "testsuite"))]
pub mod test_support;

pub use aas::Aas;
pub use model::{AdaptiveAllocationsConfig, DeploymentAssignment};
pub use requests::{
    GetDeploymentStatsRequest, GetDeploymentStatsResponse, NodeDeploymentStats,
    UpdateTrainedModelDeploymentRequest, UpdateTrainedModelDeploymentResponse,
};
pub use scaler::PerDeploymentScaler;
pub use stats::Stats;
