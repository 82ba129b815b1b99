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

//! Deployment assignment snapshot consumed by the reconcile step.

/// A model deployment assignment as observed in cluster state: the target
/// allocation count the assignment currently carries, and an optional
/// adaptive-allocations block.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentAssignment {
    pub deployment_id: String,
    pub total_target_allocations: i32,
    pub adaptive_allocations: Option<AdaptiveAllocationsConfig>,
}

impl DeploymentAssignment {
    pub fn for_test(deployment_id: impl Into<String>, total_target_allocations: i32) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            total_target_allocations,
            adaptive_allocations: Some(AdaptiveAllocationsConfig {
                enabled: true,
                min_allocations: None,
                max_allocations: None,
            }),
        }
    }

    pub fn with_bounds(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        if let Some(adaptive) = self.adaptive_allocations.as_mut() {
            adaptive.min_allocations = min;
            adaptive.max_allocations = max;
        }
        self
    }

    pub fn without_adaptive_allocations(mut self) -> Self {
        self.adaptive_allocations = None;
        self
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(&self.adaptive_allocations, Some(a) if a.enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveAllocationsConfig {
    pub enabled: bool,
    pub min_allocations: Option<i32>,
    pub max_allocations: Option<i32>,
}
