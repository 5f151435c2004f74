//! Ollama local generation API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::llm::provider::{LlmProvider, ProviderConfig, error_body, http_client};

const PROVIDER: &str = "Ollama";

pub const DEFAULT_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        if config.model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "Ollama model name is empty".to_string(),
            ));
        }

        let url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: http_client(PROVIDER, config.timeout)?,
            url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        debug!("POST {} (model: {})", url, self.model);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        debug!("Ollama responded with HTTP {}", status);
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER,
                    detail: e.to_string(),
                })?;

        if parsed.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(PROVIDER));
        }

        debug!("Ollama reply:\n{}", parsed.response);
        Ok(parsed.response)
    }
}
