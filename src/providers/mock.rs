/*!
 * Mock model implementations for testing.
 *
 * This module provides a scripted `CodeModel` that simulates different behaviors:
 * - `MockModel::working()` - Always succeeds with generated code
 * - `MockModel::intermittent(n)` - Fails every nth request
 * - `MockModel::failing()` - Always fails with an error
 * - `MockModel::empty()` - Answers with nothing
 * - `MockModel::fenced()` - Wraps the code in a markdown fence
 *
 * Every call is recorded so tests can assert which models were tried.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::CodeModel;
use crate::errors::ProviderError;

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model: String,
    pub system: String,
    pub prompt: String,
}

/// Behavior mode for the mock model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
    /// Returns the code inside a markdown fence with a short preamble
    Fenced,
}

/// Scripted model for tests
#[derive(Debug, Clone)]
pub struct MockModel {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Models that always fail regardless of behavior
    failing_models: Vec<String>,
    custom_response: Option<fn(&MockCall) -> String>,
}

impl MockModel {
    /// Create a new mock model with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_models: Vec::new(),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Make requests for `model` fail
    pub fn with_failing_model(mut self, model: impl Into<String>) -> Self {
        self.failing_models.push(model.into());
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockCall) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Model names requested so far, in order
    pub fn requested_models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.model.clone()).collect()
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn code_for(&self, call: &MockCall) -> String {
        match self.custom_response {
            Some(generator) => generator(call),
            None => format!("# generated by {}\nresult = 42\n", call.model),
        }
    }
}

#[async_trait]
impl CodeModel for MockModel {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let call = MockCall {
            model: model.to_string(),
            system: system.to_string(),
            prompt: prompt.to_string(),
        };
        self.calls.lock().push(call.clone());

        if self.failing_models.iter().any(|m| m == model) {
            return Err(ProviderError::ApiError {
                status_code: 404,
                message: format!("model '{}' not found", model),
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.code_for(&call)),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure on request {}", count + 1),
                    })
                } else {
                    Ok(self.code_for(&call))
                }
            }
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Fenced => Ok(format!(
                "Here is the converted code:\n\n```python\n{}```\n",
                self.code_for(&call)
            )),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
