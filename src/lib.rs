//! commitgen - A CLI tool that writes conventional commit messages for git changes.
//!
//! # Overview
//!
//! commitgen collects staged, unstaged or untracked changes with git2, asks an
//! external AI CLI (Claude, Gemini or Copilot) for a one-line commit subject,
//! cleans and validates the answer, and optionally records the commit.

pub mod commit;
pub mod error;
pub mod provider;
pub mod rules;

// Re-export commonly used types
pub use commit::{AnalysisMode, ChangeSet, CommitMessage, GeneratedMessage};
pub use error::{AnalysisError, CommitError, ProviderError, ValidationError};
pub use provider::{ProviderExecutor, ProviderRegistry, ProviderSpec};
pub use rules::{CONVENTIONAL_TYPES, CommitRules, CommitTypeRule};
