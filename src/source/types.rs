use std::fmt;

use serde::Deserialize;

/// Terminal outcome of a single CI check run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    /// No conclusion reported yet.
    Pending,
    Unknown(String),
}

impl Conclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Neutral => "neutral",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Stale => "stale",
            Conclusion::Pending => "pending",
            Conclusion::Unknown(other) => other,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }
}

impl From<&str> for Conclusion {
    fn from(s: &str) -> Self {
        match s {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "neutral" => Conclusion::Neutral,
            "cancelled" => Conclusion::Cancelled,
            "skipped" => Conclusion::Skipped,
            "timed_out" => Conclusion::TimedOut,
            "action_required" => Conclusion::ActionRequired,
            "stale" => Conclusion::Stale,
            "pending" => Conclusion::Pending,
            other => Conclusion::Unknown(other.to_string()),
        }
    }
}

impl From<Option<String>> for Conclusion {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Conclusion::from(s.as_str()),
            None => Conclusion::Pending,
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CI job outcome for one commit, as returned by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub sha: String,
    pub workflow_name: String,
    pub name: String,
    #[serde(default)]
    pub job_name: Option<String>,
    pub conclusion: Conclusion,
}

/// Response envelope of the batched check query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResults {
    pub results: Vec<CheckResult>,
}

impl CheckResults {
    /// Checks belonging to `sha`, in record order.
    pub fn for_commit<'a>(&'a self, sha: &'a str) -> impl Iterator<Item = &'a CheckResult> + 'a {
        self.results.iter().filter(move |check| check.sha == sha)
    }
}
