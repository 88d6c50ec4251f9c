use crate::error::Result;
use crate::policy::GreenPolicy;
use crate::selector::{render_status, select_latest_green};
use crate::source::types::CheckResults;
use crate::source::{CheckResultSource, CommitRangeSource};

/// Everything one run produced.
#[derive(Debug)]
pub struct FinderOutcome {
    pub commits: Vec<String>,
    pub results: CheckResults,
    pub latest_green: Option<String>,
}

impl FinderOutcome {
    pub fn status_report(&self) -> String {
        render_status(&self.commits, &self.results)
    }
}

/// Lists commits, fetches their checks, and picks the latest green one.
pub struct ViableCommitFinder {
    commits: Box<dyn CommitRangeSource>,
    checks: Box<dyn CheckResultSource>,
    policy: GreenPolicy,
}

impl ViableCommitFinder {
    pub fn new(
        commits: Box<dyn CommitRangeSource>,
        checks: Box<dyn CheckResultSource>,
        policy: GreenPolicy,
    ) -> Self {
        Self {
            commits,
            checks,
            policy,
        }
    }

    pub async fn run(&self) -> Result<FinderOutcome> {
        let commits = self.commits.list_commits().await?;
        let results = self.checks.fetch_checks(&commits).await?;

        tracing::info!(
            commits = commits.len(),
            checks = results.results.len(),
            "Evaluating commits"
        );

        let latest_green = select_latest_green(&commits, &results, &self.policy).map(String::from);

        Ok(FinderOutcome {
            commits,
            results,
            latest_green,
        })
    }
}
