use crate::policy::GreenPolicy;
use crate::source::types::CheckResults;

/// Return the first commit in `commits` that the policy accepts.
///
/// `commits` is expected newest first, so this is the latest green commit.
pub fn select_latest_green<'a>(
    commits: &'a [String],
    results: &CheckResults,
    policy: &GreenPolicy,
) -> Option<&'a str> {
    for commit in commits {
        let verdict = policy.evaluate(commit, results);
        if verdict.is_green() {
            tracing::info!(commit = %commit, "Found green commit");
            return Some(commit.as_str());
        }
        tracing::debug!(commit = %commit, reason = verdict.reason(), "Commit is not green");
    }

    tracing::info!(candidates = commits.len(), "No green commit in range");
    None
}

/// Render each commit followed by its checks, one per line.
pub fn render_status(commits: &[String], results: &CheckResults) -> String {
    let mut out = String::new();
    for commit in commits {
        out.push_str(&format!("{commit}\n"));
        for check in results.for_commit(commit) {
            out.push_str(&format!(
                "\t{:>10}: {}\n",
                check.conclusion.as_str(),
                check.name
            ));
        }
    }
    out
}
