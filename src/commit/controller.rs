//! One suggestion round trip: staged changes in, commit (or not) out.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::commit::choice::{Choice, parse_choice};
use crate::commit::prompter::SelectionPrompter;
use crate::error::{CommitFlowError, ProviderError};
use crate::llm::{CommitSuggestion, LlmProvider, build_prompt, parse_suggestions};
use crate::tui::spinner::{GenerationOutcome, Spinner, race_worker};
use crate::vcs::{ChangeSummary, VersionControlBackend};

const SPINNER_MESSAGE: &str = "Generating commit message suggestions... (q to cancel)";

/// How a commit round trip ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(String),
    /// The user backed out at some step. Nothing was committed.
    Cancelled,
    /// The provider replied but no well-formed suggestion was found.
    NoSuggestions,
}

pub struct SelectionController<'a, B: VersionControlBackend + ?Sized, P: SelectionPrompter> {
    backend: &'a B,
    provider: Arc<dyn LlmProvider>,
    prompter: P,
}

impl<'a, B, P> SelectionController<'a, B, P>
where
    B: VersionControlBackend + ?Sized,
    P: SelectionPrompter,
{
    pub fn new(backend: &'a B, provider: Arc<dyn LlmProvider>, prompter: P) -> Self {
        Self {
            backend,
            provider,
            prompter,
        }
    }

    /// Collect the staged summary, failing before any network call when
    /// nothing is staged.
    pub fn prepare(&self) -> Result<ChangeSummary, CommitFlowError> {
        let summary = ChangeSummary::collect(self.backend)?;
        if summary.is_empty() {
            return Err(CommitFlowError::NothingStaged);
        }
        Ok(summary)
    }

    /// Run the provider on a background task and race it against `cancel`.
    pub async fn generate<C>(
        &self,
        summary: &ChangeSummary,
        cancel: C,
    ) -> Result<GenerationOutcome<Vec<CommitSuggestion>>, CommitFlowError>
    where
        C: Future<Output = ()>,
    {
        let prompt = build_prompt(&summary.render());
        debug!(
            "Built prompt of {} bytes for {} provider",
            prompt.len(),
            self.provider.name()
        );

        let (tx, rx) = oneshot::channel::<Result<String, ProviderError>>();
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let result = provider.generate(&prompt).await;
            // The receiver is gone when the user cancelled.
            let _ = tx.send(result);
        });

        let spinner = Spinner::start(SPINNER_MESSAGE);
        let outcome = race_worker(rx, cancel).await;
        spinner.finish();

        match outcome? {
            GenerationOutcome::Cancelled => Ok(GenerationOutcome::Cancelled),
            GenerationOutcome::Completed(reply) => {
                let reply = reply?;
                debug!("Raw provider reply:\n{}", reply);
                Ok(GenerationOutcome::Completed(parse_suggestions(&reply)))
            }
        }
    }

    /// Ask until the user picks a suggestion, types a message or cancels.
    pub fn select(&self, suggestions: &[CommitSuggestion]) -> Result<Option<String>, CommitFlowError> {
        loop {
            let input = self.prompter.read_choice(suggestions.len())?;
            match parse_choice(&input, suggestions.len()) {
                Choice::Index(i) => return Ok(Some(suggestions[i].message.clone())),
                Choice::Custom(message) => return Ok(Some(message)),
                Choice::Cancel => return Ok(None),
                Choice::OutOfRange(raw) => {
                    self.prompter.notify(&format!(
                        "Invalid selection '{}': choose 1-{}, 0 to cancel, or type a message",
                        raw,
                        suggestions.len()
                    ));
                }
            }
        }
    }

    /// Record the staged set with `message`.
    pub fn apply(&self, message: &str) -> Result<(), CommitFlowError> {
        self.backend.commit(message)?;
        info!("Committed: {}", message);
        Ok(())
    }

    /// Full round trip: prepare, generate, select, confirm, commit.
    pub async fn run<C>(&self, cancel: C) -> Result<CommitOutcome, CommitFlowError>
    where
        C: Future<Output = ()>,
    {
        let summary = self.prepare()?;
        self.prompter.show_staged(&summary.records);

        let suggestions = match self.generate(&summary, cancel).await? {
            GenerationOutcome::Cancelled => return Ok(CommitOutcome::Cancelled),
            GenerationOutcome::Completed(suggestions) => suggestions,
        };
        if suggestions.is_empty() {
            return Ok(CommitOutcome::NoSuggestions);
        }

        self.prompter.show_suggestions(&suggestions);
        let Some(message) = self.select(&suggestions)? else {
            return Ok(CommitOutcome::Cancelled);
        };

        if !self
            .prompter
            .confirm(&format!("Commit with message '{message}'?"))?
        {
            return Ok(CommitOutcome::Cancelled);
        }

        self.apply(&message)?;
        Ok(CommitOutcome::Committed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::prompter::MockSelectionPrompter;
    use crate::error::VcsError;
    use crate::llm::MockProvider;
    use crate::vcs::{ChangeRecord, ChangeStatus, MockVersionControlBackend};
    use mockall::Sequence;
    use mockall::predicate::eq;

    const REPLY: &str = "1 - Add feature\nExplanation: adds feature\n\n2 - Fix bug";

    fn staged_backend() -> MockVersionControlBackend {
        let mut backend = MockVersionControlBackend::new();
        backend.expect_list_changes().returning(|| {
            Ok(vec![
                ChangeRecord::new("a.go", ChangeStatus::Added, true),
                ChangeRecord::new("b.go", ChangeStatus::Modified, true),
            ])
        });
        backend
            .expect_staged_diff_text()
            .returning(|| Ok("=== a.go ===\n+package a\n=== b.go ===\n-x\n+y\n".to_string()));
        backend
    }

    fn quiet_prompter() -> MockSelectionPrompter {
        let mut prompter = MockSelectionPrompter::new();
        prompter.expect_show_staged().return_const(());
        prompter.expect_notify().return_const(());
        prompter
    }

    #[tokio::test]
    async fn test_end_to_end_commits_selected_suggestion() {
        let mut backend = staged_backend();
        backend
            .expect_commit()
            .with(eq("Add feature"))
            .times(1)
            .returning(|_| Ok(()));

        let mut prompter = quiet_prompter();
        prompter
            .expect_show_suggestions()
            .withf(|s: &[CommitSuggestion]| {
                s == [
                    CommitSuggestion::new("Add feature", "adds feature"),
                    CommitSuggestion::new("Fix bug", ""),
                ]
            })
            .times(1)
            .return_const(());
        prompter
            .expect_read_choice()
            .with(eq(2))
            .times(1)
            .returning(|_| Ok("1".to_string()));
        prompter.expect_confirm().times(1).returning(|_| Ok(true));

        let provider = Arc::new(MockProvider::with_reply(REPLY));
        let controller = SelectionController::new(&backend, provider.clone(), prompter);

        let outcome = controller.run(std::future::pending()).await.unwrap();

        assert_eq!(outcome, CommitOutcome::Committed("Add feature".to_string()));
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("a.go (added)"));
        assert!(prompts[0].contains("b.go (modified)"));
    }

    #[tokio::test]
    async fn test_nothing_staged_fails_before_provider_call() {
        let mut backend = MockVersionControlBackend::new();
        backend
            .expect_list_changes()
            .returning(|| Ok(vec![ChangeRecord::new("a.go", ChangeStatus::Added, false)]));
        backend.expect_commit().never();

        let provider = Arc::new(MockProvider::with_reply(REPLY));
        let controller =
            SelectionController::new(&backend, provider.clone(), MockSelectionPrompter::new());

        let result = controller.run(std::future::pending()).await;

        assert!(matches!(result, Err(CommitFlowError::NothingStaged)));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_no_suggestions() {
        let mut backend = staged_backend();
        backend.expect_commit().never();

        let provider = Arc::new(MockProvider::with_reply("I cannot help with that."));
        let controller = SelectionController::new(&backend, provider, quiet_prompter());

        let outcome = controller.run(std::future::pending()).await.unwrap();
        assert_eq!(outcome, CommitOutcome::NoSuggestions);
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let mut backend = staged_backend();
        backend.expect_commit().never();

        let provider = Arc::new(MockProvider::with_error("connection refused"));
        let controller = SelectionController::new(&backend, provider, quiet_prompter());

        let err = controller.run(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, CommitFlowError::Provider(ProviderError::Mock(_))));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_cancel_during_generation_commits_nothing() {
        struct SlowProvider;

        #[async_trait::async_trait]
        impl LlmProvider for SlowProvider {
            fn name(&self) -> &'static str {
                "Slow"
            }

            async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Ok(REPLY.to_string())
            }
        }

        let mut backend = staged_backend();
        backend.expect_commit().never();
        let controller = SelectionController::new(&backend, Arc::new(SlowProvider), quiet_prompter());

        let outcome = controller.run(async {}).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_token_at_selection_commits_nothing() {
        let mut backend = staged_backend();
        backend.expect_commit().never();

        let mut prompter = quiet_prompter();
        prompter.expect_show_suggestions().return_const(());
        prompter.expect_read_choice().returning(|_| Ok("0".to_string()));
        prompter.expect_confirm().never();

        let controller =
            SelectionController::new(&backend, Arc::new(MockProvider::with_reply(REPLY)), prompter);

        let outcome = controller.run(std::future::pending()).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_declined_confirmation_commits_nothing() {
        let mut backend = staged_backend();
        backend.expect_commit().never();

        let mut prompter = quiet_prompter();
        prompter.expect_show_suggestions().return_const(());
        prompter.expect_read_choice().returning(|_| Ok("2".to_string()));
        prompter
            .expect_confirm()
            .withf(|m: &str| m.contains("Fix bug"))
            .returning(|_| Ok(false));

        let controller =
            SelectionController::new(&backend, Arc::new(MockProvider::with_reply(REPLY)), prompter);

        let outcome = controller.run(std::future::pending()).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Cancelled);
    }

    #[test]
    fn test_select_reprompts_after_out_of_range() {
        let backend = MockVersionControlBackend::new();
        let mut seq = Sequence::new();
        let mut prompter = MockSelectionPrompter::new();
        prompter
            .expect_read_choice()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("7".to_string()));
        prompter
            .expect_notify()
            .withf(|m: &str| m.contains("Invalid selection '7'"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        prompter
            .expect_read_choice()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("2".to_string()));

        let controller =
            SelectionController::new(&backend, Arc::new(MockProvider::with_reply("")), prompter);
        let suggestions = vec![
            CommitSuggestion::new("Add feature", ""),
            CommitSuggestion::new("Fix bug", ""),
        ];

        assert_eq!(controller.select(&suggestions).unwrap(), Some("Fix bug".to_string()));
    }

    #[test]
    fn test_select_custom_message_is_used_verbatim() {
        let backend = MockVersionControlBackend::new();
        let mut prompter = MockSelectionPrompter::new();
        prompter
            .expect_read_choice()
            .returning(|_| Ok("docs: explain setup".to_string()));

        let controller =
            SelectionController::new(&backend, Arc::new(MockProvider::with_reply("")), prompter);
        let suggestions = vec![CommitSuggestion::new("Add feature", "")];

        assert_eq!(
            controller.select(&suggestions).unwrap(),
            Some("docs: explain setup".to_string())
        );
    }

    #[test]
    fn test_apply_surfaces_missing_identity() {
        let mut backend = MockVersionControlBackend::new();
        backend
            .expect_commit()
            .times(1)
            .returning(|_| Err(VcsError::MissingIdentity));

        let controller = SelectionController::new(
            &backend,
            Arc::new(MockProvider::with_reply("")),
            MockSelectionPrompter::new(),
        );

        let err = controller.apply("Add feature").unwrap_err();
        assert!(matches!(err, CommitFlowError::Vcs(VcsError::MissingIdentity)));
    }
}
