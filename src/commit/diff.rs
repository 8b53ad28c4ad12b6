//! Change collection from the repository using git2.
//!
//! Produces the analysis text handed to the prompt builder: file lists, a
//! diff stat, and a capped excerpt of each file's diff or contents.

use std::fmt;
use std::path::Path;

use git2::{Diff, DiffStatsFormat, ErrorCode, Patch, Repository, Status, StatusOptions, Tree};
use tracing::{debug, warn};

use crate::error::AnalysisError;

/// Maximum bytes of diff or file content included per file.
pub const MAX_EXCERPT_BYTES: usize = 2000;

/// Width used when rendering the diff stat.
const STAT_WIDTH: usize = 80;

/// Characters that disqualify a path from being read or diffed individually.
const UNSAFE_PATH_CHARS: &[char] = &['&', '|', ';', '<', '>', '(', ')', '$', '`', '"', '\''];

/// Which changes to analyze (and later commit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Changes already in the index.
    Staged,
    /// Tracked modifications plus untracked files.
    All,
    /// Untracked files only.
    Untracked,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Staged => write!(f, "staged"),
            AnalysisMode::All => write!(f, "all"),
            AnalysisMode::Untracked => write!(f, "untracked"),
        }
    }
}

/// A changed file and, when it could be read, an excerpt of its changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub excerpt: Option<String>,
}

/// Changes collected for one analysis mode.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub mode: AnalysisMode,
    /// `git diff --stat` style summary of `modified`; empty outside staged mode.
    pub stat: String,
    /// Staged files (staged mode) or tracked modifications (all mode).
    pub modified: Vec<FileChange>,
    /// Untracked files with the start of their contents.
    pub untracked: Vec<FileChange>,
}

impl ChangeSet {
    pub fn file_count(&self) -> usize {
        self.modified.len() + self.untracked.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modified
            .iter()
            .chain(self.untracked.iter())
            .map(|f| f.path.as_str())
    }

    /// Render the analysis text for the prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();

        match self.mode {
            AnalysisMode::Staged => {
                out.push_str("=== STAGED CHANGES ANALYSIS ===\n");
                out.push_str(&format!("Files changed: {}\n", self.modified.len()));
                out.push_str(&format!("Files: {}\n\n", join_paths(&self.modified)));
                out.push_str("=== DIFF ===\n");
                out.push_str(&self.stat);
                out.push_str("\n=== DETAILED CHANGES ===\n");
                push_excerpts(&mut out, &self.modified, "");
            }
            AnalysisMode::All => {
                out.push_str("=== ALL CHANGES ANALYSIS ===\n");
                if !self.modified.is_empty() {
                    out.push_str(&format!("Modified files: {}\n", self.modified.len()));
                    out.push_str("=== MODIFIED FILES ===\n");
                    out.push_str(&format!("{}\n\n", join_paths(&self.modified)));
                    out.push_str("=== MODIFICATIONS ===\n");
                    push_excerpts(&mut out, &self.modified, "");
                }
                if !self.untracked.is_empty() {
                    out.push_str("\n=== UNTRACKED FILES ===\n");
                    out.push_str(&format!("{}\n\n", join_paths(&self.untracked)));
                    out.push_str("=== FILE CONTENTS ===\n");
                    push_excerpts(&mut out, &self.untracked, " (new)");
                }
            }
            AnalysisMode::Untracked => {
                out.push_str("=== UNTRACKED FILES ANALYSIS ===\n");
                out.push_str(&format!("Files: {}\n", self.untracked.len()));
                out.push_str(&format!("{}\n\n", join_paths(&self.untracked)));
                out.push_str("=== FILE CONTENTS ===\n");
                push_excerpts(&mut out, &self.untracked, "");
            }
        }

        out
    }
}

fn join_paths(files: &[FileChange]) -> String {
    files
        .iter()
        .map(|f| f.path.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_excerpts(out: &mut String, files: &[FileChange], label: &str) {
    for file in files {
        if let Some(ref excerpt) = file.excerpt {
            out.push_str(&format!("\n--- {}{} ---\n", file.path, label));
            out.push_str(excerpt);
        }
    }
}

/// Whether a path is safe to read or diff on its own.
///
/// Rejects empty paths, traversal (`..`) and shell metacharacters. Unsafe
/// paths are still listed, just without an excerpt.
pub fn is_safe_path(path: &str) -> bool {
    !path.is_empty() && !path.contains("..") && !path.contains(UNSAFE_PATH_CHARS)
}

/// Cut `text` to at most `max_bytes`, backing off to a char boundary.
pub fn truncate_excerpt(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, AnalysisError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(AnalysisError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(AnalysisError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the changes for the given mode.
pub fn collect_changes(repo: &Repository, mode: AnalysisMode) -> Result<ChangeSet, AnalysisError> {
    let workdir = repo.workdir().ok_or(AnalysisError::BareRepository)?;

    let change_set = match mode {
        AnalysisMode::Staged => {
            let head_tree = resolve_head_tree(repo)?;
            let diff = repo
                .diff_tree_to_index(head_tree.as_ref(), None, None)
                .map_err(AnalysisError::DiffFailed)?;
            let modified = collect_patches(&diff);
            if modified.is_empty() {
                return Err(AnalysisError::NoStagedFiles);
            }
            ChangeSet {
                mode,
                stat: render_stat(&diff),
                modified,
                untracked: Vec::new(),
            }
        }
        AnalysisMode::All => {
            let head_tree = resolve_head_tree(repo)?;
            let diff = repo
                .diff_tree_to_workdir_with_index(head_tree.as_ref(), None)
                .map_err(AnalysisError::DiffFailed)?;
            let modified = collect_patches(&diff);
            let untracked = collect_untracked(repo, workdir)?;
            if modified.is_empty() && untracked.is_empty() {
                return Err(AnalysisError::NoChanges);
            }
            ChangeSet {
                mode,
                stat: String::new(),
                modified,
                untracked,
            }
        }
        AnalysisMode::Untracked => {
            let untracked = collect_untracked(repo, workdir)?;
            if untracked.is_empty() {
                return Err(AnalysisError::NoUntrackedFiles);
            }
            ChangeSet {
                mode,
                stat: String::new(),
                modified: Vec::new(),
                untracked,
            }
        }
    };

    debug!(
        "Collected {} changed files in {} mode",
        change_set.file_count(),
        mode
    );

    Ok(change_set)
}

/// Collect changes and render them as analysis text.
pub fn analyze_changes(repo: &Repository, mode: AnalysisMode) -> Result<String, AnalysisError> {
    collect_changes(repo, mode).map(|changes| changes.render())
}

/// One entry per delta, with a capped unified diff excerpt.
fn collect_patches(diff: &Diff<'_>) -> Vec<FileChange> {
    let mut files = Vec::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        if path.is_empty() {
            continue;
        }

        let excerpt = if is_safe_path(&path) {
            patch_text(diff, idx)
        } else {
            debug!("Skipping excerpt for unsafe path '{}'", path);
            None
        };

        files.push(FileChange { path, excerpt });
    }

    files
}

fn patch_text(diff: &Diff<'_>, idx: usize) -> Option<String> {
    let result = Patch::from_diff(diff, idx).and_then(|patch| match patch {
        Some(mut patch) => patch.to_buf().map(|buf| Some(buf.to_vec())),
        None => Ok(None),
    });

    match result {
        Ok(Some(bytes)) => {
            let text = String::from_utf8_lossy(&bytes);
            Some(truncate_excerpt(&text, MAX_EXCERPT_BYTES).to_string())
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Failed to render patch for delta {}: {}", idx, e);
            None
        }
    }
}

fn render_stat(diff: &Diff<'_>) -> String {
    let rendered = diff
        .stats()
        .and_then(|stats| stats.to_buf(DiffStatsFormat::FULL, STAT_WIDTH));

    match rendered {
        Ok(buf) => buf.as_str().unwrap_or("").to_string(),
        Err(e) => {
            warn!("Failed to render diff stat: {}", e);
            String::new()
        }
    }
}

/// Untracked, non-ignored files with the start of their contents.
fn collect_untracked(repo: &Repository, workdir: &Path) -> Result<Vec<FileChange>, AnalysisError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(AnalysisError::DiffFailed)?;

    let mut files: Vec<FileChange> = statuses
        .iter()
        .filter(|entry| entry.status().contains(Status::WT_NEW))
        .filter_map(|entry| entry.path().map(String::from))
        .map(|path| {
            let excerpt = if is_safe_path(&path) {
                read_excerpt(&workdir.join(&path))
            } else {
                debug!("Skipping excerpt for unsafe path '{}'", path);
                None
            };
            FileChange { path, excerpt }
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn read_excerpt(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            Some(truncate_excerpt(&text, MAX_EXCERPT_BYTES).to_string())
        }
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}
