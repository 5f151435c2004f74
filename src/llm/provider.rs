//! Provider abstraction and the factory that picks one per invocation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ProviderError};
use crate::llm::anthropic::AnthropicProvider;
use crate::llm::mock::MockProvider;
use crate::llm::ollama::OllamaProvider;

/// Default request deadline for provider calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default token budget for a reply.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A backend that turns a prompt into free-text.
///
/// One call, one reply. Implementations never retry: a failed call is
/// reported to the user, who can simply run the command again.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Supported provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    Ollama,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Mock => "mock",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::Ollama => "llama3.2",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Read-only provider settings resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub max_tokens: u32,
    /// Base URL of the API; `None` uses the provider's default.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Seeded reply for the mock provider.
    pub mock_reply: Option<String>,
}

impl ProviderConfig {
    /// Defaults for `kind` with no endpoint or credential.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mock_reply: None,
        }
    }
}

/// Build the provider selected by `config`.
///
/// This is the only place that branches on provider identity.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    debug!(
        "Creating {} provider (model: {}, max_tokens: {})",
        config.kind, config.model, config.max_tokens
    );

    let provider: Arc<dyn LlmProvider> = match config.kind {
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::from_config(config)?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::from_config(config)?),
        ProviderKind::Mock => Arc::new(MockProvider::with_reply(
            config.mock_reply.clone().unwrap_or_default(),
        )),
    };

    Ok(provider)
}

/// Shared HTTP client with the configured deadline.
pub(crate) fn http_client(
    provider: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("gitai/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| ProviderError::Transport { provider, source })
}

/// Read at most a short excerpt of an error body for display.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(500).collect()
}
