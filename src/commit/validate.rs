//! Conventional commit format and length validation.

use std::fmt;

use crate::error::ValidationError;
use crate::rules::CommitRules;

/// Hard ceiling on the subject line, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 72;

/// Recommended subject line length, in characters.
pub const RECOMMENDED_MESSAGE_LENGTH: usize = 50;

/// Advisory notice for a message longer than recommended but still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthWarning {
    pub length: usize,
    pub recommended: usize,
}

impl fmt::Display for LengthWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Commit message is {} characters (recommended: <{})",
            self.length, self.recommended
        )
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub length: usize,
    pub warning: Option<LengthWarning>,
}

impl Validation {
    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }
}

/// Validate a commit message against the conventional commit format.
///
/// Checks, in order: a colon separator, a registered type before the
/// optional `(scope)`, and the length ceiling. Messages longer than
/// [`RECOMMENDED_MESSAGE_LENGTH`] pass with a [`LengthWarning`].
pub fn validate_commit_message(
    message: &str,
    rules: &CommitRules,
) -> Result<Validation, ValidationError> {
    let message = message.trim();

    let Some((header, _description)) = message.split_once(':') else {
        return Err(ValidationError::MalformedFormat);
    };

    let header = header.trim();
    let commit_type = header.split_once('(').map_or(header, |(ty, _)| ty);

    if !rules.contains(commit_type) {
        return Err(ValidationError::InvalidType {
            found: commit_type.to_string(),
            valid: rules.types().into_iter().map(String::from).collect(),
        });
    }

    let length = message.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::TooLong {
            length,
            max: MAX_MESSAGE_LENGTH,
        });
    }

    let warning = (length > RECOMMENDED_MESSAGE_LENGTH).then_some(LengthWarning {
        length,
        recommended: RECOMMENDED_MESSAGE_LENGTH,
    });

    Ok(Validation { length, warning })
}

impl CommitRules {
    /// Validate a message against this rule set.
    pub fn validate(&self, message: &str) -> Result<Validation, ValidationError> {
        validate_commit_message(message, self)
    }
}
