//! LLM providers, prompt construction and reply parsing.

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use parser::{CommitSuggestion, SuggestionParser, parse_suggestions};
pub use prompt::{MAX_SUBJECT_LENGTH, SUGGESTION_COUNT, build_prompt};
pub use provider::{LlmProvider, ProviderConfig, ProviderKind, create_provider};
