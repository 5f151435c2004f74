//! Interpretation of the user's answer to the suggestion prompt.

/// What the user typed at the selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the suggestion list.
    Index(usize),
    Cancel,
    /// Free text used verbatim as the commit message.
    Custom(String),
    /// A number with no matching suggestion.
    OutOfRange(String),
}

/// Parse one line of input against `count` suggestions.
///
/// Empty input, `0` and `q` cancel. A number in `1..=count` picks a
/// suggestion; any other number is out of range. Surrounding whitespace is
/// ignored for these checks. Everything else is a custom message, kept
/// exactly as typed.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let token = input.trim();
    if token.is_empty() || token.eq_ignore_ascii_case("q") {
        return Choice::Cancel;
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        return match token.parse::<usize>() {
            Ok(0) => Choice::Cancel,
            Ok(n) if n <= count => Choice::Index(n - 1),
            _ => Choice::OutOfRange(token.to_string()),
        };
    }

    Choice::Custom(input.to_string())
}
