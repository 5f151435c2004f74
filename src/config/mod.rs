//! User configuration: TOML file plus environment overrides.
//!
//! The file lives at `<config dir>/gitai/config.toml` (or `$GITAI_CONFIG`).
//! A missing file means defaults. Environment variables are applied on top
//! of the file when loading for use, but never written back by `save`.

pub mod setup;
pub mod show;

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::anthropic;
use crate::llm::ollama;
use crate::llm::provider::{DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
use crate::llm::{ProviderConfig, ProviderKind};

pub const CONFIG_PATH_ENV: &str = "GITAI_CONFIG";
pub const PROVIDER_ENV: &str = "GITAI_PROVIDER";
pub const MODEL_ENV: &str = "GITAI_MODEL";
pub const MAX_TOKENS_ENV: &str = "GITAI_MAX_TOKENS";
pub const OLLAMA_URL_ENV: &str = "GITAI_OLLAMA_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub logger: LoggerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `None` until the user picks a provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub anthropic: AnthropicSettings,
    pub ollama: OllamaSettings,
    pub mock: MockSettings,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            anthropic: AnthropicSettings::default(),
            ollama: OllamaSettings::default(),
            mock: MockSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Location of the config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("gitai").join("config.toml"))
}

impl Config {
    /// Load the file and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    /// Load the file only, as `save` would write it back.
    pub fn load_file() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `GITAI_*` and `ANTHROPIC_API_KEY` overrides.
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_env(&mut self) {
        if let Some(value) = non_empty_var(PROVIDER_ENV) {
            match value.parse::<ProviderKind>() {
                Ok(kind) => self.llm.provider = Some(kind),
                Err(e) => warn!("Invalid {} value '{}': {}", PROVIDER_ENV, value, e),
            }
        }

        if let Some(value) = non_empty_var(MAX_TOKENS_ENV) {
            match value.parse::<u32>() {
                Ok(tokens) if tokens > 0 => self.llm.max_tokens = tokens,
                _ => warn!(
                    "Invalid {} value '{}', using {}",
                    MAX_TOKENS_ENV, value, self.llm.max_tokens
                ),
            }
        }

        if let Some(key) = non_empty_var(anthropic::API_KEY_ENV) {
            self.llm.anthropic.api_key = Some(key);
        }

        if let Some(url) = non_empty_var(OLLAMA_URL_ENV) {
            self.llm.ollama.url = Some(url);
        }

        if let Some(model) = non_empty_var(MODEL_ENV) {
            match self.provider_kind() {
                ProviderKind::Anthropic => self.llm.anthropic.model = Some(model),
                ProviderKind::Ollama => self.llm.ollama.model = Some(model),
                ProviderKind::Mock => debug!("Ignoring {} for mock provider", MODEL_ENV),
            }
        }
    }

    /// Whether a provider has been chosen, in the file or the environment.
    pub fn is_configured(&self) -> bool {
        self.llm.provider.is_some()
    }

    /// Active provider, Anthropic when none is configured.
    pub fn provider_kind(&self) -> ProviderKind {
        self.llm.provider.unwrap_or_default()
    }

    /// Model of the active provider.
    pub fn model(&self) -> String {
        let kind = self.provider_kind();
        let configured = match kind {
            ProviderKind::Anthropic => self.llm.anthropic.model.as_deref(),
            ProviderKind::Ollama => self.llm.ollama.model.as_deref(),
            ProviderKind::Mock => None,
        };
        configured.unwrap_or(kind.default_model()).to_string()
    }

    /// Endpoint of the active provider, with defaults filled in.
    pub fn endpoint(&self) -> Option<String> {
        match self.provider_kind() {
            ProviderKind::Anthropic => Some(
                self.llm
                    .anthropic
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| anthropic::DEFAULT_ENDPOINT.to_string()),
            ),
            ProviderKind::Ollama => Some(
                self.llm
                    .ollama
                    .url
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_URL.to_string()),
            ),
            ProviderKind::Mock => None,
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logger.level.as_deref()
    }

    /// Read-only settings handed to the provider factory.
    pub fn provider_config(&self) -> ProviderConfig {
        let kind = self.provider_kind();
        ProviderConfig {
            kind,
            model: self.model(),
            max_tokens: self.llm.max_tokens,
            endpoint: self.endpoint(),
            api_key: match kind {
                ProviderKind::Anthropic => self.llm.anthropic.api_key.clone(),
                _ => None,
            },
            timeout: Duration::from_secs(self.llm.timeout_secs),
            mock_reply: self.llm.mock.reply.clone(),
        }
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write atomically, readable only by the owner (the file may hold a key).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        let mut file = NamedTempFile::new_in(parent).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
