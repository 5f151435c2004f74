//! Parsing of free-text provider replies into commit suggestions.
//!
//! The reply is read line by line in a single pass. A numbered line opens a
//! new suggestion (committing the one already open), an `Explanation:` line
//! annotates the open suggestion, and everything else is discarded. Providers
//! often wrap the list in preamble or trailing commentary; none of it can
//! reach a message or an explanation.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, trace};

/// Numbered suggestion header: `1 - text`, `1. text` or `1. - text`.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9][0-9]*(?:\s*\.\s*-|\s*-|\.)\s+(\S.*)$").expect("Invalid regex")
});

const EXPLANATION_PREFIX: &str = "explanation:";

/// A single commit message suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSuggestion {
    pub message: String,
    /// May be empty when the provider gave no explanation.
    pub explanation: String,
}

impl CommitSuggestion {
    pub fn new(message: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug)]
enum ParserState {
    Seeking,
    InSuggestion(CommitSuggestion),
}

/// Classification of one trimmed reply line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Header(&'a str),
    Explanation(&'a str),
    Other,
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = HEADER_RE.captures(line)
        && let Some(text) = caps.get(1)
    {
        return Line::Header(text.as_str().trim());
    }

    if line
        .get(..EXPLANATION_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(EXPLANATION_PREFIX))
    {
        return Line::Explanation(line[EXPLANATION_PREFIX.len()..].trim());
    }

    Line::Other
}

/// Incremental suggestion parser.
///
/// Feed lines in order with [`SuggestionParser::feed`], then call
/// [`SuggestionParser::finish`] to collect the suggestions.
#[derive(Debug)]
pub struct SuggestionParser {
    suggestions: Vec<CommitSuggestion>,
    state: ParserState,
}

impl Default for SuggestionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionParser {
    pub fn new() -> Self {
        Self {
            suggestions: Vec::new(),
            state: ParserState::Seeking,
        }
    }

    /// Process the next reply line.
    pub fn feed(&mut self, line: &str) {
        match classify(line) {
            Line::Blank => {}
            Line::Header(message) => {
                trace!("Suggestion header: {}", message);
                self.commit_open();
                self.state = ParserState::InSuggestion(CommitSuggestion::new(message, ""));
            }
            Line::Explanation(text) => match &mut self.state {
                ParserState::InSuggestion(open) => {
                    trace!("Explanation: {}", text);
                    open.explanation = text.to_string();
                }
                ParserState::Seeking => trace!("Explanation outside a suggestion dropped"),
            },
            Line::Other => trace!("Discarding line: {}", line.trim()),
        }
    }

    /// Commit any open suggestion and return the well-formed ones in order.
    pub fn finish(mut self) -> Vec<CommitSuggestion> {
        self.commit_open();
        self.suggestions
            .into_iter()
            .filter(|s| !s.message.trim().is_empty())
            .collect()
    }

    fn commit_open(&mut self) {
        if let ParserState::InSuggestion(open) =
            std::mem::replace(&mut self.state, ParserState::Seeking)
        {
            self.suggestions.push(open);
        }
    }
}

/// Parse a raw provider reply into suggestions.
///
/// Malformed input yields an empty list, never an error.
pub fn parse_suggestions(reply: &str) -> Vec<CommitSuggestion> {
    let mut parser = SuggestionParser::new();
    for line in reply.lines() {
        parser.feed(line);
    }
    let suggestions = parser.finish();
    debug!("Parsed {} suggestions from reply", suggestions.len());
    suggestions
}
