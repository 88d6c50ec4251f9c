pub mod fixture;
pub mod git;
pub mod rockset;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// Produces the candidate commits to evaluate, most recent first.
#[async_trait]
pub trait CommitRangeSource: Send + Sync {
    /// List commits from the known-good marker up to the mainline tip.
    ///
    /// An empty range is an error.
    async fn list_commits(&self) -> Result<Vec<String>>;
}

/// Produces CI check outcomes for a batch of commits.
#[async_trait]
pub trait CheckResultSource: Send + Sync {
    /// Fetch every check record for `commits` in one batch.
    ///
    /// `commits` must be non-empty.
    async fn fetch_checks(&self, commits: &[String]) -> Result<CheckResults>;
}
