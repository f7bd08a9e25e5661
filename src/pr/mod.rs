pub mod diff;
pub mod types;

pub use types::{PullRequest, ReviewComment};
#[cfg(test)]
pub use types::{FileChange, FileStatus};

use async_trait::async_trait;
use thiserror::Error;

use crate::review::Review;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Pull request #{0} not found")]
    NotFound(u64),

    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to parse diff: {0}")]
    DiffParse(String),
}

/// The code-hosting service the bot reads pull requests from and writes
/// reviews to. Implemented for GitHub by [`crate::github::GitHubClient`].
///
/// Every method targets the single repository the implementation was
/// configured with.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Numbers of all open pull requests, in the host's listing order.
    async fn list_open_pull_requests(&self) -> Result<Vec<u64>, HostError>;

    /// Fetch description, changed files and review comments of one PR.
    async fn fetch_pull_request(&self, number: u64) -> Result<PullRequest, HostError>;

    async fn label_exists(&self, name: &str) -> Result<bool, HostError>;

    async fn create_label(&self, name: &str) -> Result<(), HostError>;

    async fn add_label(&self, number: u64, name: &str) -> Result<(), HostError>;

    /// Record the review's body and verdict against the PR.
    async fn submit_review(&self, number: u64, review: &Review) -> Result<(), HostError>;
}
