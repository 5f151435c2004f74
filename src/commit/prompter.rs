//! User interaction seam of the commit flow.

use dialoguer::{Confirm, Input};

use crate::error::CommitFlowError;
use crate::llm::CommitSuggestion;
use crate::vcs::ChangeRecord;

/// Everything the commit flow shows to or asks of the user.
#[cfg_attr(test, mockall::automock)]
pub trait SelectionPrompter {
    fn show_staged(&self, records: &[ChangeRecord]);

    fn show_suggestions(&self, suggestions: &[CommitSuggestion]);

    /// Read one raw answer to the selection prompt.
    fn read_choice(&self, count: usize) -> Result<String, CommitFlowError>;

    fn confirm(&self, message: &str) -> Result<bool, CommitFlowError>;

    fn notify(&self, message: &str);
}

/// Format the suggestion list as printed to the user.
pub fn format_suggestions(suggestions: &[CommitSuggestion]) -> String {
    let mut out = String::from("Suggested commit messages:\n");
    for (i, suggestion) in suggestions.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", i + 1, suggestion.message));
        if !suggestion.explanation.is_empty() {
            out.push_str(&format!("   {}\n", suggestion.explanation));
        }
    }
    out
}

/// Prompter backed by stdout and dialoguer.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl SelectionPrompter for TerminalPrompter {
    fn show_staged(&self, records: &[ChangeRecord]) {
        println!("→ Found {} staged files", records.len());
        for record in records {
            println!("  {} {}", record.status.marker(), record.path);
        }
    }

    fn show_suggestions(&self, suggestions: &[CommitSuggestion]) {
        println!();
        print!("{}", format_suggestions(suggestions));
        println!();
    }

    fn read_choice(&self, count: usize) -> Result<String, CommitFlowError> {
        Input::<String>::new()
            .with_prompt(format!(
                "Select (1-{count}), 0 to cancel, or type your own message"
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CommitFlowError::Prompt(e.to_string()))
    }

    fn confirm(&self, message: &str) -> Result<bool, CommitFlowError> {
        Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()
            .map_err(|e| CommitFlowError::Prompt(e.to_string()))
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}
