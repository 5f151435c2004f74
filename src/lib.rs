//! gitai - stage changes and commit them with LLM-suggested messages.
//!
//! # Overview
//!
//! The staged diff is summarized ([`vcs::ChangeSummary`]), turned into a
//! deterministic prompt ([`llm::build_prompt`]) and sent to one provider
//! (Anthropic, Ollama or an offline mock). The free-text reply is parsed into
//! numbered [`llm::CommitSuggestion`]s, the user picks one or types their
//! own, and the staged set is committed. An interactive staging view
//! ([`tui::StagingSession`]) can run first to choose what gets committed.

pub mod commit;
pub mod config;
pub mod error;
pub mod gitignore;
pub mod llm;
pub mod tui;
pub mod vcs;

// Re-export commonly used types
pub use commit::{CommitOutcome, SelectionController};
pub use config::Config;
pub use error::{CommitFlowError, ConfigError, GitignoreError, ProviderError, StagingError, VcsError};
pub use llm::{CommitSuggestion, LlmProvider, ProviderConfig, ProviderKind, parse_suggestions};
pub use vcs::{ChangeRecord, ChangeStatus, ChangeSummary, GitBackend, VersionControlBackend};
