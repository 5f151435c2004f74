//! Error types for gitai modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the version-control backend.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Not a git repository (or any parent up to mount point): {}", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("Git author identity is not configured. Set user.name and user.email with `git config`")]
    MissingIdentity,

    #[error("Nothing staged to commit. Use `gitai add` or `git add` to stage changes")]
    NothingStaged,

    #[error("Bare repositories are not supported")]
    BareRepository,

    #[error("Git operation failed: {0}")]
    Git(#[source] git2::Error),
}

impl From<git2::Error> for VcsError {
    fn from(err: git2::Error) -> Self {
        VcsError::Git(err)
    }
}

/// Errors from LLM provider calls.
///
/// Transport and status failures are kept apart from content problems:
/// an unparseable reply is not an error here, it simply yields no suggestions.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} is not set. Export it or run `gitai config setup`")]
    MissingCredential(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a response that could not be decoded: {detail}")]
    InvalidResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    #[error("{0}")]
    Mock(String),
}

/// Errors from loading, saving or editing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported LLM provider: '{0}' (valid: anthropic, ollama, mock)")]
    UnknownProvider(String),

    #[error("Setup cancelled: {0}")]
    Prompt(String),
}

/// Errors from the suggestion-generation and commit flow.
#[derive(Error, Debug)]
pub enum CommitFlowError {
    #[error("No staged changes found. Use `gitai add` or `git add` to stage changes")]
    NothingStaged,

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Suggestion worker stopped before reporting a result")]
    WorkerLost,

    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("Failed to read input: {0}")]
    Prompt(String),
}

/// Errors from the interactive staging session.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("This command requires an interactive terminal")]
    NotInteractive,

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),
}

/// Errors from .gitignore generation.
#[derive(Error, Debug)]
pub enum GitignoreError {
    #[error("At least one template name is required")]
    NoTemplates,

    #[error("Failed to fetch template {name}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to back up existing .gitignore: {0}")]
    Backup(#[source] std::io::Error),

    #[error("Failed to write .gitignore: {0}")]
    Write(#[source] std::io::Error),
}
