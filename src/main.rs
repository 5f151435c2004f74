//! gitai - CLI entry point.

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gitai::commit::{CommitOutcome, SelectionController, TerminalPrompter};
use gitai::config::{self, Config, setup, show};
use gitai::gitignore::{self, TemplateClient};
use gitai::llm::create_provider;
use gitai::tui::{SessionEnd, run_staging_view, wait_for_cancel_key};
use gitai::vcs::{GitBackend, VersionControlBackend};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "GITAI_LOG";

/// Write better commit messages with an LLM.
#[derive(Parser, Debug)]
#[command(name = "gitai")]
#[command(about = "Stage changes and commit them with LLM-suggested messages")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactively stage and unstage changed files
    Add,
    /// Generate commit message suggestions for the staged changes and commit
    Commit,
    /// Stage interactively, then commit with a suggested message
    Auto,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Work with .gitignore files
    Gitignore {
        #[command(subcommand)]
        action: GitignoreAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Choose a provider and model interactively
    Setup,
}

#[derive(Subcommand, Debug)]
enum GitignoreAction {
    /// Generate .gitignore from github/gitignore templates (e.g. go node python)
    Generate {
        /// Template names
        templates: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // File settings first so the configured log level applies to env warnings.
    let mut config = Config::load_file().context("Failed to load configuration")?;
    init_logging(cli.verbose, config.log_level());
    config.apply_env();
    debug!("Running {:?}", cli.command);

    match cli.command {
        Command::Add => {
            let backend = open_repository()?;
            run_add(&backend)?;
        }
        Command::Commit => {
            let backend = open_repository()?;
            run_commit(&backend, &config).await?;
        }
        Command::Auto => {
            let backend = open_repository()?;
            if run_add(&backend)? == SessionEnd::Cancelled {
                return Ok(());
            }
            if !backend.list_changes()?.iter().any(|record| record.staged) {
                bail!("no files staged for commit");
            }
            run_commit(&backend, &config).await?;
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let path = config::config_path().ok();
                print!("{}", show::render(&config, path.as_deref()));
            }
            ConfigAction::Setup => {
                let current = Config::load_file().context("Failed to load configuration")?;
                let updated = setup::run_setup(current)?;
                let path = updated.save()?;
                println!("Configuration saved to {}", path.display());
            }
        },
        Command::Gitignore { action } => match action {
            GitignoreAction::Generate { templates } => {
                let client = TemplateClient::new()?;
                let report = gitignore::generate(&client, &templates, Path::new("."))
                    .await
                    .context("Failed to generate .gitignore")?;
                if let Some(backup) = &report.backup {
                    println!("Existing .gitignore moved to {}", backup.display());
                }
                println!(
                    "Successfully generated .gitignore with templates: {}",
                    templates.join(", ")
                );
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool, config_level: Option<&str>) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = if verbose {
            "debug"
        } else {
            config_level.unwrap_or("warn")
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_repository() -> Result<GitBackend> {
    Ok(GitBackend::discover(".")?)
}

fn run_add(backend: &GitBackend) -> Result<SessionEnd> {
    let end = run_staging_view(backend)?;
    if end == SessionEnd::Confirmed {
        let staged = backend
            .list_changes()?
            .into_iter()
            .filter(|record| record.staged)
            .count();
        println!("→ {staged} files staged");
    }
    Ok(end)
}

async fn run_commit(backend: &GitBackend, config: &Config) -> Result<()> {
    let provider = create_provider(&config.provider_config())?;
    let controller = SelectionController::new(backend, provider, TerminalPrompter);

    match controller.run(wait_for_cancel_key()).await? {
        CommitOutcome::Committed(message) => println!("✓ Committed: {message}"),
        CommitOutcome::Cancelled => println!("Commit cancelled"),
        CommitOutcome::NoSuggestions => {
            bail!("no usable suggestions: the provider reply contained no numbered messages")
        }
    }
    Ok(())
}
