//! AI-suggested commit messages: generation, selection and commit.

pub mod choice;
pub mod controller;
pub mod prompter;

pub use choice::{Choice, parse_choice};
pub use controller::{CommitOutcome, SelectionController};
pub use prompter::{SelectionPrompter, TerminalPrompter, format_suggestions};
