/// Sentinel sent to the model in place of a patch for files without changed lines.
pub const NO_CHANGES: &str = "no changes";

/// Snapshot of a pull request as fetched for one review cycle.
/// Note: Not Deserialize — PullRequest is assembled from the GitHub API JSON
/// response, the parsed diff (FileChange) and the comment thread.
#[derive(Debug, Clone)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author's GitHub login
    pub author: String,
    /// PR body; empty when the PR has no description
    pub description: String,
    /// Changed files, in diff order
    pub files: Vec<FileChange>,
    /// Review comments, in API order
    pub comments: Vec<ReviewComment>,
}

impl PullRequest {
    pub fn additions(&self) -> usize {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(|f| f.deletions).sum()
    }
}

/// How a file was touched by the PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // GitHub's own vocabulary, so the model sees familiar words
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Deleted => write!(f, "removed"),
            FileStatus::Renamed => write!(f, "renamed"),
        }
    }
}

/// A single file within the PR diff.
/// Populated by the diff parser in diff.rs.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// File path after the change (e.g., "src/auth/config.rs")
    pub path: String,
    pub status: FileStatus,
    /// Lines added in this file
    pub additions: usize,
    /// Lines deleted in this file
    pub deletions: usize,
    /// Raw hunk text, `None` when the diff carries no hunks for this file
    pub patch: Option<String>,
}

impl FileChange {
    pub fn changes(&self) -> usize {
        self.additions + self.deletions
    }

    /// Patch text for the prompt. Never empty: files without changed lines
    /// yield [`NO_CHANGES`].
    pub fn patch_text(&self) -> &str {
        match self.patch.as_deref() {
            Some(patch) if self.changes() != 0 && !patch.trim().is_empty() => patch,
            _ => NO_CHANGES,
        }
    }
}

/// One comment from the PR's review thread.
#[derive(Debug, Clone)]
pub struct ReviewComment {
    pub body: String,
}
