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

//! The `Client` collaborator: a typed, fire-and-forget dispatch boundary for
//! outbound administrative actions, in the same spirit as a typed RPC client
//! trait used for per-node dispatch.

use async_trait::async_trait;

use crate::error::LifecycleError;

/// A typed outbound action. Each request type names its own response type,
/// so `Client::execute` stays generic instead of each call site juggling an
/// untyped envelope.
pub trait Action: Send + Sync + 'static {
    type Response: Send + 'static;
}

/// Dispatches typed administrative actions.
///
/// Implementations are expected to be cheap to clone (e.g. `Arc`-wrapped
/// transport handles) since both control loops hold one for their full
/// lifetime and call into it from spawned tasks.
#[async_trait]
pub trait Client<A: Action>: Send + Sync {
    async fn execute(&self, request: A) -> Result<A::Response, LifecycleError>;
}

#[cfg(test)]
pub mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Records every request it receives and returns a pre-programmed
    /// response for it, in declaration order. Panics if exhausted, which is
    /// the point: tests over-provisioning responses masks missing
    /// assertions about call count.
    pub struct RecordingClient<A: Action> {
        responses: Mutex<VecDeque<Result<A::Response, String>>>,
        requests: Mutex<Vec<A>>,
    }

    impl<A: Action + Clone> RecordingClient<A> {
        pub fn new(responses: Vec<Result<A::Response, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<A> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl<A> Client<A> for RecordingClient<A>
    where
        A: Action + Clone,
    {
        async fn execute(&self, request: A) -> Result<A::Response, LifecycleError> {
            self.requests.lock().unwrap().push(request);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("RecordingClient exhausted its programmed responses");
            next.map_err(LifecycleError::client)
        }
    }
}
