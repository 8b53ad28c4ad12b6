//! commitgen - CLI entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use git2::Repository;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commitgen::commit::{AnalysisMode, collect_changes, generate_commit_message, record_commit};
use commitgen::error::AnalysisError;
use commitgen::provider::{ProviderCommand, ProviderRegistry, SubprocessExecutor, check_installed};
use commitgen::rules::CommitRules;

/// Generate conventional commit messages with an AI CLI.
#[derive(Parser, Debug)]
#[command(name = "commitgen")]
#[command(about = "Generate conventional commit messages with an AI CLI")]
#[command(version)]
struct Cli {
    /// AI provider to use (claude, gemini, copilot)
    #[arg(long, global = true, env = "COMMITGEN_PROVIDER", default_value = "claude")]
    provider: String,

    /// Commit without asking for confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print the generated message without committing
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra provider attempts after a failure
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a message for changes and commit them
    Commit {
        /// Which changes to describe
        #[arg(value_enum, default_value_t = ModeArg::Staged)]
        mode: ModeArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Changes already in the index
    #[value(alias = "s")]
    Staged,
    /// Staged, unstaged and untracked changes
    #[value(alias = "a")]
    All,
    /// New files not yet tracked
    #[value(alias = "u")]
    Untracked,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Staged => AnalysisMode::Staged,
            ModeArg::All => AnalysisMode::All,
            ModeArg::Untracked => AnalysisMode::Untracked,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode: AnalysisMode = match cli.command {
        Some(Command::Commit { mode }) => mode.into(),
        None => AnalysisMode::Staged,
    };

    run(&cli, mode).await
}

async fn run(cli: &Cli, mode: AnalysisMode) -> Result<()> {
    // Step 1: Open git repository
    let repo = Repository::discover(".").map_err(AnalysisError::NotGitRepo)?;

    // Step 2: Collect changes
    let changes = collect_changes(&repo, mode)?;
    debug!("Collected {} changed files ({})", changes.file_count(), mode);

    // Step 3: Resolve provider
    let spec = ProviderRegistry::standard().resolve(&cli.provider)?;
    check_installed(&spec).with_context(|| {
        format!(
            "The {} CLI is required for provider '{}'",
            spec.program, cli.provider
        )
    })?;

    println!("Generating commit message with {}...", cli.provider);

    // Step 4: Generate message
    let executor = SubprocessExecutor::new(ProviderCommand::from_spec(&spec));
    let rules = CommitRules::conventional();
    let attempts = provider_attempts(cli.retries);
    let generated = generate_commit_message(&changes.render(), &rules, &executor, attempts)
        .await
        .context("Failed to generate commit message")?;

    match generated.validation {
        Ok(ref validation) => {
            if let Some(ref warning) = validation.warning {
                eprintln!("Warning: {}", warning);
            }
        }
        Err(ref e) => eprintln!("Warning: {}", e),
    }

    println!("Generated commit message:\n\"{}\"", generated.message);

    if cli.dry_run {
        return Ok(());
    }

    // Step 5: Confirm and commit
    let confirmed = cli.yes
        || confirmation(
            Confirm::new()
                .with_prompt("Use this commit message?")
                .default(false)
                .interact(),
        );

    if !confirmed {
        println!("Commit cancelled.");
        return Ok(());
    }

    let oid = record_commit(&repo, &changes, &generated.message).context("Failed to commit")?;
    debug!("Commit id: {}", oid);
    println!("Committed successfully!");

    Ok(())
}

/// Total provider attempts for `--retries N`.
fn provider_attempts(retries: u32) -> u32 {
    retries.saturating_add(1)
}

/// A prompt that cannot be answered (closed or non-terminal stdin) declines.
fn confirmation(answer: Result<bool, dialoguer::Error>) -> bool {
    match answer {
        Ok(confirmed) => confirmed,
        Err(e) => {
            debug!("Confirmation unavailable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_add_to_first_attempt() {
        assert_eq!(provider_attempts(0), 1);
        assert_eq!(provider_attempts(1), 2);
        assert_eq!(provider_attempts(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_retries_flag_defaults_to_zero() {
        let cli = Cli::try_parse_from(["commitgen"]).unwrap();
        assert_eq!(cli.retries, 0);

        let cli = Cli::try_parse_from(["commitgen", "commit", "a", "--retries", "2"]).unwrap();
        assert_eq!(cli.retries, 2);
        assert!(matches!(
            cli.command,
            Some(Command::Commit { mode: ModeArg::All })
        ));
    }

    #[test]
    fn test_unreadable_confirmation_declines() {
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed");
        assert!(!confirmation(Err(dialoguer::Error::IO(eof))));
        assert!(confirmation(Ok(true)));
        assert!(!confirmation(Ok(false)));
    }
}
