use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::source::types::{CheckResult, CheckResults};
use crate::source::{CheckResultSource, CommitRangeSource};

/// A fixed commit range, newest first.
pub struct FixtureCommitRange {
    commits: Vec<String>,
}

impl FixtureCommitRange {
    pub fn new(commits: Vec<String>) -> Self {
        Self { commits }
    }

    /// Read newline-separated hashes, ignoring blank lines.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let commits = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(Self::new(commits))
    }
}

#[async_trait]
impl CommitRangeSource for FixtureCommitRange {
    async fn list_commits(&self) -> Result<Vec<String>> {
        if self.commits.is_empty() {
            return Err(AppError::EmptyCommitRange(
                "fixture contains no commits".to_string(),
            ));
        }
        Ok(self.commits.clone())
    }
}

/// Canned check results, shaped like a query service response.
pub struct FixtureCheckSource {
    results: Vec<CheckResult>,
}

impl FixtureCheckSource {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    /// Read a `{"results": [...]}` JSON document.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let parsed: CheckResults = serde_json::from_str(&contents)?;
        Ok(Self::new(parsed.results))
    }
}

#[async_trait]
impl CheckResultSource for FixtureCheckSource {
    async fn fetch_checks(&self, commits: &[String]) -> Result<CheckResults> {
        if commits.is_empty() {
            return Err(AppError::QueryService(
                "Refusing to query check results for an empty commit set".to_string(),
            ));
        }
        let wanted: HashSet<&str> = commits.iter().map(String::as_str).collect();
        let results = self
            .results
            .iter()
            .filter(|check| wanted.contains(check.sha.as_str()))
            .cloned()
            .collect();
        Ok(CheckResults { results })
    }
}
