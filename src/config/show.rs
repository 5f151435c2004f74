//! `config show`: print the effective configuration without secrets.

use std::fmt::Write;
use std::path::Path;

use crate::config::Config;
use crate::llm::ProviderKind;

/// Render the effective configuration for display.
///
/// The API key itself is never included, only whether one is set.
pub fn render(config: &Config, path: Option<&Path>) -> String {
    if !config.is_configured() {
        return "No configuration found. Run 'gitai config setup' to configure gitai.\n"
            .to_string();
    }

    let kind = config.provider_kind();
    let mut out = String::from("Current configuration\n");
    if let Some(path) = path {
        let _ = writeln!(out, "  File: {}", path.display());
    }

    out.push_str("\nProvider settings:\n");
    let _ = writeln!(out, "  • Provider: {kind}");
    let _ = writeln!(out, "  • Model: {}", config.model());
    match kind {
        ProviderKind::Anthropic => {
            if let Some(endpoint) = config.endpoint() {
                let _ = writeln!(out, "  • Endpoint: {endpoint}");
            }
            let key_state = if config.llm.anthropic.api_key.is_some() {
                "set"
            } else {
                "not set"
            };
            let _ = writeln!(out, "  • API key: {key_state}");
        }
        ProviderKind::Ollama => {
            if let Some(url) = config.endpoint() {
                let _ = writeln!(out, "  • URL: {url}");
            }
        }
        ProviderKind::Mock => {}
    }
    let _ = writeln!(out, "  • Max tokens: {}", config.llm.max_tokens);
    let _ = writeln!(out, "  • Timeout: {}s", config.llm.timeout_secs);

    if let Some(level) = config.log_level() {
        let _ = writeln!(out, "\nLog level: {level}");
    }
    out
}
