//! Offline provider returning a seeded reply.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::llm::provider::LlmProvider;

/// Provider that never touches the network.
///
/// Every call returns the same seeded reply or error, and the prompts it
/// received are recorded for inspection.
#[derive(Debug)]
pub struct MockProvider {
    outcome: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            outcome: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("Mock provider received prompt of {} bytes", prompt.len());
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.outcome.clone().map_err(ProviderError::Mock)
    }
}
