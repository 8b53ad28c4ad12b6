//! Conventional commit message generation from repository changes.

pub mod diff;
pub mod message;
pub mod normalize;
pub mod prompt;
pub mod validate;

pub use diff::{AnalysisMode, ChangeSet, FileChange, analyze_changes, collect_changes, is_safe_path};
pub use message::{CommitMessage, GeneratedMessage, generate_commit_message, record_commit};
pub use normalize::clean_commit_message;
pub use prompt::{PromptBuilder, build_prompt};
pub use validate::{
    LengthWarning, MAX_MESSAGE_LENGTH, RECOMMENDED_MESSAGE_LENGTH, Validation,
    validate_commit_message,
};
