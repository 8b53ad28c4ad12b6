//! Error types for commitgen modules using thiserror.

use thiserror::Error;

/// Reasons a commit message fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("commit message must follow format: type(scope): description")]
    MalformedFormat,

    #[error("invalid commit type: {found}. Valid types: {}", valid.join(", "))]
    InvalidType { found: String, valid: Vec<String> },

    #[error("commit message is too long: {length} characters (maximum: {max})")]
    TooLong { length: usize, max: usize },
}

/// Errors from invoking a generation provider CLI.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("unsupported provider '{name}'. Supported providers: {}", supported.join(", "))]
    Unsupported { name: String, supported: Vec<String> },

    #[error("{program} CLI not found in PATH")]
    NotInstalled { program: String },

    #[error("Failed to spawn provider process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to write prompt to provider stdin: {0}")]
    StdinFailed(#[source] std::io::Error),

    #[error("Provider CLI failed to execute: {0}")]
    ExecutionFailed(String),

    #[error("Provider process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Provider CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ProviderError>),
}

/// Errors from collecting local changes for analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("not in a git repository")]
    NotGitRepo(#[source] git2::Error),

    #[error("no staged files found")]
    NoStagedFiles,

    #[error("no untracked files found")]
    NoUntrackedFiles,

    #[error("no changes found to analyze")]
    NoChanges,

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Bare repository not supported")]
    BareRepository,
}

/// Errors from recording a commit.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}
