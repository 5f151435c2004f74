//! `config setup`: interactive provider wizard.

use dialoguer::{Input, Password, Select};
use tracing::debug;

use crate::config::Config;
use crate::error::ConfigError;
use crate::llm::{ProviderKind, ollama};

/// Models offered for Anthropic; the first is the default.
pub const ANTHROPIC_MODELS: [&str; 3] = [
    "claude-3-5-haiku-latest",
    "claude-3-5-sonnet-latest",
    "claude-3-opus-latest",
];

const PROVIDERS: [ProviderKind; 2] = [ProviderKind::Anthropic, ProviderKind::Ollama];

fn prompt_err(e: dialoguer::Error) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}

/// Record Anthropic settings. A blank key keeps the existing one.
pub fn apply_anthropic(config: &mut Config, api_key: &str, model: &str) {
    config.llm.provider = Some(ProviderKind::Anthropic);
    if !api_key.trim().is_empty() {
        config.llm.anthropic.api_key = Some(api_key.trim().to_string());
    }
    config.llm.anthropic.model = Some(model.to_string());
}

pub fn apply_ollama(config: &mut Config, url: &str, model: &str) {
    config.llm.provider = Some(ProviderKind::Ollama);
    config.llm.ollama.url = Some(url.trim().trim_end_matches('/').to_string());
    config.llm.ollama.model = Some(model.trim().to_string());
}

/// Ask for provider settings and return the updated configuration.
pub fn run_setup(mut config: Config) -> Result<Config, ConfigError> {
    let labels = ["Anthropic", "Ollama"];
    let current = PROVIDERS
        .iter()
        .position(|kind| Some(*kind) == config.llm.provider)
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt("Select AI provider")
        .items(&labels)
        .default(current)
        .interact()
        .map_err(prompt_err)?;

    match PROVIDERS[choice] {
        ProviderKind::Anthropic => {
            let has_key = config.llm.anthropic.api_key.is_some();
            let prompt = if has_key {
                "Enter Anthropic API key (leave empty to keep the current one)"
            } else {
                "Enter Anthropic API key"
            };
            let api_key = Password::new()
                .with_prompt(prompt)
                .allow_empty_password(has_key)
                .interact()
                .map_err(prompt_err)?;

            let current_model = config
                .llm
                .anthropic
                .model
                .as_deref()
                .and_then(|m| ANTHROPIC_MODELS.iter().position(|known| *known == m))
                .unwrap_or(0);
            let model = Select::new()
                .with_prompt("Select Claude model")
                .items(&ANTHROPIC_MODELS)
                .default(current_model)
                .interact()
                .map_err(prompt_err)?;

            apply_anthropic(&mut config, &api_key, ANTHROPIC_MODELS[model]);
        }
        ProviderKind::Ollama | ProviderKind::Mock => {
            let url: String = Input::new()
                .with_prompt("Enter Ollama URL")
                .default(
                    config
                        .llm
                        .ollama
                        .url
                        .clone()
                        .unwrap_or_else(|| ollama::DEFAULT_URL.to_string()),
                )
                .interact_text()
                .map_err(prompt_err)?;
            let model: String = Input::new()
                .with_prompt("Enter model name")
                .default(
                    config
                        .llm
                        .ollama
                        .model
                        .clone()
                        .unwrap_or_else(|| ProviderKind::Ollama.default_model().to_string()),
                )
                .interact_text()
                .map_err(prompt_err)?;

            apply_ollama(&mut config, &url, &model);
        }
    }

    debug!("Setup selected {}", config.provider_kind());
    Ok(config)
}
