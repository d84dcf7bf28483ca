use std::sync::Mutex;
use std::time::Duration;

use super::{LlmClient, LlmError};

/// What a [`MockLlmClient`] does when asked to generate.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond(String),
    /// Sleep, then respond. Simulates a slow model.
    Delayed(Duration, String),
    Timeout,
    Unavailable,
}

/// Mock LLM client for testing. Returns a configurable response and
/// remembers every prompt it was given.
pub struct MockLlmClient {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_behavior(MockBehavior::Respond(response.to_string()))
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::Delayed(delay, text) => {
                std::thread::sleep(*delay);
                Ok(text.clone())
            }
            MockBehavior::Timeout => Err(LlmError::Timeout(30)),
            MockBehavior::Unavailable => Err(LlmError::Unavailable("http://mock".into())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
