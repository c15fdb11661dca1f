/*!
 * Mock completion implementation for testing.
 *
 * The mock is deterministic: the same prompt always yields the same
 * response, which is what the pipeline's resume tests rely on. It also
 * records every prompt it receives and can be configured to fail on a
 * specific call, simulating an interrupted run.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::errors::ProviderError;
use crate::translation::core::Completion;

/// Behavior mode for the mock completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds with a deterministic response
    Working,
    /// Always fails with an error
    Failing,
    /// Fails on the Nth call (0-based), succeeds otherwise
    FailAt {
        /// Call index that fails
        call: usize,
    },
}

/// Mock completion for exercising the pipeline without a provider
#[derive(Debug, Clone)]
pub struct MockCompletion {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of calls made so far
    calls: Arc<AtomicUsize>,
    /// Every prompt received, in call order
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletion {
    /// Create a mock with the given behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// A mock that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A mock that fails on the given call index (0-based)
    pub fn fail_at(call: usize) -> Self {
        Self::new(MockBehavior::FailAt { call })
    }

    /// Number of completion calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every prompt received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// The deterministic response the mock produces for a prompt
    pub fn response_for(prompt: &str) -> String {
        let digest = Sha256::digest(prompt.as_bytes());
        format!(
            "mock:{:02x}{:02x}{:02x}{:02x}",
            digest[0], digest[1], digest[2], digest[3]
        )
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock completion configured to fail".to_string(),
            )),
            MockBehavior::FailAt { call: fail_call } if call == fail_call => Err(
                ProviderError::RequestFailed(format!("mock completion failed at call {}", call)),
            ),
            _ => Ok(Self::response_for(prompt)),
        }
    }
}
