//! Commit message generation via a provider and git staging/commit operations.

use std::fmt;
use std::path::Path;

use git2::{IndexAddOption, Oid, Repository};
use tracing::debug;

use crate::commit::diff::{AnalysisMode, ChangeSet};
use crate::commit::normalize::clean_commit_message;
use crate::commit::prompt::PromptBuilder;
use crate::commit::validate::{Validation, validate_commit_message};
use crate::error::{CommitError, ProviderError, ValidationError};
use crate::provider::{ProviderExecutor, generate_with_retry};
use crate::rules::CommitRules;

/// A commit subject split into its conventional parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// Text before the scope parenthesis (or before the colon without scope).
    pub raw_type: String,
    pub scope: Option<String>,
    pub description: String,
}

impl CommitMessage {
    /// Split `type(scope): description` on the first colon and first `(`.
    ///
    /// Returns `None` when there is no colon. The type is not checked against
    /// any registry.
    pub fn parse(message: &str) -> Option<Self> {
        let (header, description) = message.trim().split_once(':')?;
        let header = header.trim();

        let (raw_type, scope) = match header.split_once('(') {
            Some((ty, rest)) => {
                let scope = rest.strip_suffix(')').unwrap_or(rest);
                (ty, (!scope.is_empty()).then(|| scope.to_string()))
            }
            None => (header, None),
        };

        Some(Self {
            raw_type: raw_type.to_string(),
            scope,
            description: description.trim().to_string(),
        })
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(ref scope) => write!(f, "{}({}): {}", self.raw_type, scope, self.description),
            None => write!(f, "{}: {}", self.raw_type, self.description),
        }
    }
}

/// Result of one generation request.
#[derive(Debug, Clone)]
pub struct GeneratedMessage {
    /// Provider response before cleaning.
    pub raw: String,
    /// Cleaned single-line message.
    pub message: String,
    /// Validation outcome; failures are reported, not fatal.
    pub validation: Result<Validation, ValidationError>,
}

impl GeneratedMessage {
    pub fn is_valid(&self) -> bool {
        self.validation.is_ok()
    }

    pub fn parsed(&self) -> Option<CommitMessage> {
        CommitMessage::parse(&self.message)
    }
}

/// Generate a commit message for the analysis text.
///
/// Builds the prompt, sends it through the executor (up to `max_attempts`
/// times), cleans the response and validates it. Only provider failures are
/// returned as errors.
pub async fn generate_commit_message<E: ProviderExecutor + ?Sized>(
    analysis: &str,
    rules: &CommitRules,
    executor: &E,
    max_attempts: u32,
) -> Result<GeneratedMessage, ProviderError> {
    let prompt = PromptBuilder::new(*rules).build(analysis);
    debug!("Commit prompt length: {} chars", prompt.len());

    let raw = generate_with_retry(executor, &prompt, max_attempts).await?;
    debug!("Raw provider response: {}", raw);

    let message = clean_commit_message(raw.trim());
    let validation = validate_commit_message(&message, rules);

    if let Err(ref e) = validation {
        debug!("Generated message failed validation: {}", e);
    }

    Ok(GeneratedMessage {
        raw,
        message,
        validation,
    })
}

/// Stage the analyzed changes (if needed) and create a commit on HEAD.
///
/// - Staged: commits the index as it is.
/// - All: stages every change, including deletions (like `git add -A`).
/// - Untracked: stages only the analyzed untracked files.
pub fn record_commit(
    repo: &Repository,
    changes: &ChangeSet,
    message: &str,
) -> Result<Oid, CommitError> {
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;

    match changes.mode {
        AnalysisMode::Staged => {}
        AnalysisMode::All => {
            index
                .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
                .map_err(CommitError::StagingFailed)?;
            index
                .update_all(["*"].iter(), None)
                .map_err(CommitError::StagingFailed)?;
        }
        AnalysisMode::Untracked => {
            for file in &changes.untracked {
                index
                    .add_path(Path::new(&file.path))
                    .map_err(CommitError::StagingFailed)?;
            }
        }
    }
    index.write().map_err(CommitError::StagingFailed)?;

    // Write the index as a tree
    let tree_id = index.write_tree().map_err(CommitError::StagingFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let sig = repo.signature().map_err(CommitError::ConfigError)?;

    // An unborn branch gets a root commit.
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(CommitError::CommitFailed)?),
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            None
        }
        Err(e) => return Err(CommitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(CommitError::CommitFailed)?;

    debug!("Created commit {}", oid);
    Ok(oid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::diff::collect_changes;
    use crate::provider::retry::MockProviderExecutor;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        (dir, repo)
    }

    fn initial_commit(dir: &tempfile::TempDir, repo: &Repository) {
        std::fs::write(dir.path().join("base.txt"), "base\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("base.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test User", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }

    #[test]
    fn test_parse_with_scope() {
        let msg = CommitMessage::parse("fix(auth): resolve login bug").unwrap();
        assert_eq!(msg.raw_type, "fix");
        assert_eq!(msg.scope.as_deref(), Some("auth"));
        assert_eq!(msg.description, "resolve login bug");
        assert_eq!(msg.to_string(), "fix(auth): resolve login bug");
    }

    #[test]
    fn test_parse_without_scope() {
        let msg = CommitMessage::parse("  chore: bump deps ").unwrap();
        assert_eq!(msg.raw_type, "chore");
        assert_eq!(msg.scope, None);
        assert_eq!(msg.description, "bump deps");
        assert_eq!(msg.to_string(), "chore: bump deps");
    }

    #[test]
    fn test_parse_without_colon() {
        assert!(CommitMessage::parse("add new feature").is_none());
    }

    #[test]
    fn test_parse_description_keeps_later_colons() {
        let msg = CommitMessage::parse("docs: explain key: value syntax").unwrap();
        assert_eq!(msg.description, "explain key: value syntax");
    }

    #[tokio::test]
    async fn test_generate_cleans_and_validates() {
        let mut mock = MockProviderExecutor::new();
        mock.expect_run()
            .withf(|prompt| prompt.ends_with("Git diff to analyze:\n=== STAGED ==="))
            .times(1)
            .returning(|_| Ok(r#"The commit message should be: "fix: resolve bug""#.to_string()));

        let generated = generate_commit_message(
            "=== STAGED ===",
            &CommitRules::conventional(),
            &mock,
            1,
        )
        .await
        .unwrap();

        assert_eq!(generated.message, "fix: resolve bug");
        assert!(generated.is_valid());
        assert!(generated.raw.contains("should be"));
        assert_eq!(generated.parsed().unwrap().raw_type, "fix");
    }

    #[tokio::test]
    async fn test_generate_reports_invalid_type_without_failing() {
        let mut mock = MockProviderExecutor::new();
        mock.expect_run()
            .returning(|_| Ok("update: tweak things".to_string()));

        let generated = generate_commit_message("diff", &CommitRules::conventional(), &mock, 1)
            .await
            .unwrap();

        assert_eq!(generated.message, "update: tweak things");
        assert!(matches!(
            generated.validation,
            Err(ValidationError::InvalidType { .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_failure() {
        let mut mock = MockProviderExecutor::new();
        mock.expect_run().times(1).returning(|_| {
            Err(ProviderError::NonZeroExit {
                code: 1,
                stderr: "boom".to_string(),
            })
        });

        let result = generate_commit_message("diff", &CommitRules::conventional(), &mock, 1).await;
        assert!(matches!(result, Err(ProviderError::NonZeroExit { code: 1, .. })));
    }

    #[test]
    fn test_record_commit_staged_only_commits_index() {
        let (dir, repo) = init_repo();
        initial_commit(&dir, &repo);

        std::fs::write(dir.path().join("staged.txt"), "s\n").unwrap();
        std::fs::write(dir.path().join("loose.txt"), "l\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("staged.txt")).unwrap();
        index.write().unwrap();

        let changes = collect_changes(&repo, AnalysisMode::Staged).unwrap();
        let oid = record_commit(&repo, &changes, "feat: add staged file").unwrap();

        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "feat: add staged file");
        let tree = commit.tree().unwrap();
        assert!(tree.get_name("staged.txt").is_some());
        assert!(tree.get_name("loose.txt").is_none());
        assert_eq!(commit.parent_count(), 1);
    }

    #[test]
    fn test_record_commit_all_stages_everything() {
        let (dir, repo) = init_repo();
        initial_commit(&dir, &repo);

        std::fs::write(dir.path().join("new.txt"), "n\n").unwrap();
        std::fs::remove_file(dir.path().join("base.txt")).unwrap();

        let changes = collect_changes(&repo, AnalysisMode::All).unwrap();
        let oid = record_commit(&repo, &changes, "chore: replace base file").unwrap();

        let tree = repo.find_commit(oid).unwrap().tree().unwrap();
        assert!(tree.get_name("new.txt").is_some());
        assert!(tree.get_name("base.txt").is_none());
    }

    #[test]
    fn test_record_commit_untracked_stages_only_untracked() {
        let (dir, repo) = init_repo();
        initial_commit(&dir, &repo);

        std::fs::write(dir.path().join("base.txt"), "changed\n").unwrap();
        std::fs::write(dir.path().join("added.txt"), "a\n").unwrap();

        let changes = collect_changes(&repo, AnalysisMode::Untracked).unwrap();
        let oid = record_commit(&repo, &changes, "feat: add file").unwrap();

        let commit = repo.find_commit(oid).unwrap();
        let tree = commit.tree().unwrap();
        assert!(tree.get_name("added.txt").is_some());

        let base = tree.get_name("base.txt").unwrap();
        let blob = repo.find_blob(base.id()).unwrap();
        assert_eq!(blob.content(), b"base\n");
    }

    #[test]
    fn test_record_commit_on_unborn_branch_creates_root() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("first.txt"), "1\n").unwrap();

        let changes = collect_changes(&repo, AnalysisMode::All).unwrap();
        let oid = record_commit(&repo, &changes, "feat: initial import").unwrap();

        assert_eq!(repo.find_commit(oid).unwrap().parent_count(), 0);
    }
}
