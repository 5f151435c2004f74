//! Prompt construction for commit message suggestions.

/// Number of suggestions requested from the provider.
pub const SUGGESTION_COUNT: usize = 3;

/// Maximum length of the first line of a suggested message.
pub const MAX_SUBJECT_LENGTH: usize = 50;

/// Build the provider-agnostic prompt for the rendered change summary.
///
/// The output format section doubles as the grammar the suggestion parser
/// accepts: numbered `N - message` lines, each optionally followed by an
/// `Explanation:` line. The same input always yields a byte-identical prompt.
pub fn build_prompt(changes: &str) -> String {
    format!(
        r#"You are a highly intelligent assistant skilled in understanding code changes. I will provide you with a list of staged files and their git diff. Your task is to analyze the changes and generate concise, descriptive commit messages that:
- Summarize the purpose of ALL changes across ALL files.
- Capture the overall intent of the changes in a single unified message.
- Use the most significant change as the primary message when several kinds of change are present.

## Reading the diff
- Each file starts with a `=== <path> ===` header
- Lines starting with '-' show REMOVED content
- Lines starting with '+' show ADDED content
- Context lines (without + or -) show where in the file the change occurs
- Added files usually mean new functionality, deleted files usually mean cleanup

## Commit message rules
1. Use imperative mood ("Add" not "Added" or "Adds")
2. Keep the message {MAX_SUBJECT_LENGTH} characters or less
3. Capitalize the first word
4. No period at the end
5. One line per message: do not split a message across lines

Optionally, use one of these Conventional Commits prefixes when the change clearly fits:
- feat: new feature
- fix: bug fix
- docs: documentation only
- style: formatting
- refactor: code change that neither fixes a bug nor adds a feature
- test: adding missing tests
- chore: maintenance

## Changes
{changes}
## Output format
Generate {SUGGESTION_COUNT} different commit messages. Format each suggestion exactly like this example, with nothing before or after the list:

1 - Add user authentication
Explanation: Implements basic user authentication

2 - Fix database connection issues
Explanation: Fixes connection pooling issues

Each suggestion is a number, " - ", and the message on one line, then an optional single "Explanation:" line."#
    )
}
