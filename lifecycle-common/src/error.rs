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

use thiserror::Error;

/// Error taxonomy shared by both control loops.
///
/// Mirrors the "transient per-index / fatal per-tick / infrastructural"
/// split: callers are expected to match on `Client`/`Config` where they need
/// to react, and fall through to `Other` for everything unclassified.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("client dispatch failed: {0}")]
    Client(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl LifecycleError {
    pub fn client(message: impl Into<String>) -> Self {
        LifecycleError::Client(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        LifecycleError::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_variant() {
        let err = LifecycleError::client("timeout");
        assert_eq!(err.to_string(), "client dispatch failed: timeout");
    }

    #[test]
    fn wraps_anyhow() {
        let cause = anyhow::anyhow!("boom");
        let err: LifecycleError = cause.into();
        assert_eq!(err.to_string(), "boom");
    }
}
