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

//! Loadable configuration, validated on construction rather than deferred
//! to first use, matching the teacher's pattern of rejecting bad config at
//! load time instead of at the call site.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_merge_policy_floor_segment_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_merge_policy_merge_factor() -> u32 {
    16
}

fn default_automatic_max_age() -> Duration {
    Duration::from_secs(30 * 24 * 60 * 60)
}

/// Shared configuration for both control loops.
///
/// Loadable from YAML; every field has a default so a minimal (or empty)
/// document is valid. `validate` enforces invariants `serde` cannot express
/// structurally (a zero poll interval, for instance).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// AAS tick period. Must be strictly positive.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub merge_policy_floor_segment_bytes: u64,
    pub merge_policy_merge_factor: u32,
    /// Max-age substituted into a rollover request's conditions when the
    /// template marks max-age as automatic and the stream's own retention
    /// does not undercut it.
    #[serde(with = "humantime_serde")]
    pub automatic_max_age: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            merge_policy_floor_segment_bytes: default_merge_policy_floor_segment_bytes(),
            merge_policy_merge_factor: default_merge_policy_merge_factor(),
            automatic_max_age: default_automatic_max_age(),
        }
    }
}

impl LifecycleConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, LifecycleError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| LifecycleError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.poll_interval.is_zero() {
            return Err(LifecycleError::config("poll_interval must be positive"));
        }
        if self.merge_policy_merge_factor < 2 {
            return Err(LifecycleError::config(
                "merge_policy_merge_factor must be at least 2",
            ));
        }
        Ok(())
    }

    /// The max-age to fold into a rollover request's conditions: the
    /// configured automatic default, unless the stream's own retention is
    /// shorter, in which case the retention wins.
    pub fn rollover_max_age(&self, retention_ms: Option<i64>) -> Duration {
        match retention_ms {
            Some(retention_ms) if retention_ms >= 0 => {
                let retention = Duration::from_millis(retention_ms as u64);
                retention.min(self.automatic_max_age)
            }
            _ => self.automatic_max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        LifecycleConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_yaml_document_is_valid() {
        let config = LifecycleConfig::from_yaml("{}").unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let err = LifecycleConfig::from_yaml("poll_interval: 0s").unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn rollover_max_age_prefers_shorter_retention() {
        let config = LifecycleConfig::default();
        let one_hour_ms = 60 * 60 * 1000;
        let short = config.rollover_max_age(Some(one_hour_ms));
        assert_eq!(short, Duration::from_millis(one_hour_ms as u64));
        assert_eq!(config.rollover_max_age(None), config.automatic_max_age);
    }
}
