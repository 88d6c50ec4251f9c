//! Green-commit policy: which CI outcomes make a commit viable.

use regex::Regex;

use crate::config::PolicyConfig;
use crate::error::{AppError, Result};
use crate::source::types::{CheckResult, CheckResults, Conclusion};

/// Outcome of evaluating one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Green,
    NotGreen { reason: String },
}

impl Verdict {
    pub fn is_green(&self) -> bool {
        matches!(self, Verdict::Green)
    }

    /// Why the commit was rejected; empty when green.
    pub fn reason(&self) -> &str {
        match self {
            Verdict::Green => "",
            Verdict::NotGreen { reason } => reason,
        }
    }

    fn rejected(reason: String) -> Self {
        Verdict::NotGreen { reason }
    }
}

#[derive(Debug)]
struct RequiredWorkflow {
    name: String,
    pattern: Regex,
}

/// Compiled form of [`PolicyConfig`].
#[derive(Debug)]
pub struct GreenPolicy {
    required: Vec<RequiredWorkflow>,
    tolerated: Vec<(String, Conclusion)>,
    release_workflows: Vec<String>,
}

impl GreenPolicy {
    pub fn new(config: &PolicyConfig) -> Result<Self> {
        if config.required_workflows.is_empty() {
            return Err(AppError::Policy(
                "at least one required workflow must be configured".to_string(),
            ));
        }

        // Case-insensitive, anchored at the start of the workflow name only.
        let required = config
            .required_workflows
            .iter()
            .map(|name| -> Result<RequiredWorkflow> {
                Ok(RequiredWorkflow {
                    name: name.clone(),
                    pattern: Regex::new(&format!("(?i)^(?:{name})"))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tolerated = config
            .tolerated_checks
            .iter()
            .map(|t| (t.name.clone(), Conclusion::from(t.conclusion.as_str())))
            .collect();

        Ok(Self {
            required,
            tolerated,
            release_workflows: config.release_workflows.clone(),
        })
    }

    /// Evaluate `sha` against its records in `results`.
    pub fn evaluate(&self, sha: &str, results: &CheckResults) -> Verdict {
        self.evaluate_checks(results.for_commit(sha))
    }

    /// Evaluate the checks of a single commit, in record order.
    pub fn evaluate_checks<'a, I>(&self, checks: I) -> Verdict
    where
        I: IntoIterator<Item = &'a CheckResult>,
    {
        let mut observed = vec![false; self.required.len()];

        for check in checks {
            let workflow = check.workflow_name.as_str();

            for (seen, required) in observed.iter_mut().zip(&self.required) {
                if !required.pattern.is_match(workflow) {
                    continue;
                }
                if check.conclusion.is_success() {
                    *seen = true;
                } else if !self.is_tolerated(check) {
                    return Verdict::rejected(format!("{workflow} checks were not successful"));
                }
            }

            if self.release_workflows.iter().any(|w| w == workflow)
                && !matches!(check.conclusion, Conclusion::Success | Conclusion::Skipped)
            {
                return Verdict::rejected(format!("{workflow} checks were not successful"));
            }
        }

        let missing: Vec<&str> = observed
            .iter()
            .zip(&self.required)
            .filter(|(seen, _)| !**seen)
            .map(|(_, required)| required.name.as_str())
            .collect();

        if !missing.is_empty() {
            return Verdict::rejected(format!(
                "missing required workflows: {}",
                missing.join(", ")
            ));
        }

        Verdict::Green
    }

    /// Tolerated checks neither disqualify the commit nor count as observed.
    fn is_tolerated(&self, check: &CheckResult) -> bool {
        self.tolerated
            .iter()
            .any(|(name, conclusion)| *name == check.name && *conclusion == check.conclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 6] = [
        "pull",
        "trunk",
        "lint",
        "linux-binary",
        "android-tests",
        "windows-binary",
    ];

    fn policy() -> GreenPolicy {
        GreenPolicy::new(&PolicyConfig::default()).unwrap()
    }

    fn check(workflow: &str, name: &str, conclusion: &str) -> CheckResult {
        CheckResult {
            sha: "abc".to_string(),
            workflow_name: workflow.to_string(),
            name: name.to_string(),
            job_name: None,
            conclusion: Conclusion::from(conclusion),
        }
    }

    fn all_required_green() -> Vec<CheckResult> {
        REQUIRED
            .iter()
            .map(|w| check(w, &format!("{w} / build"), "success"))
            .collect()
    }

    #[test]
    fn test_no_checks_reports_every_required_workflow() {
        let checks: Vec<CheckResult> = Vec::new();
        let verdict = policy().evaluate_checks(&checks);
        assert_eq!(
            verdict.reason(),
            "missing required workflows: pull, trunk, lint, linux-binary, android-tests, windows-binary"
        );
        assert!(!verdict.is_green());
    }

    #[test]
    fn test_all_required_success_is_green() {
        let verdict = policy().evaluate_checks(&all_required_green());
        assert_eq!(verdict, Verdict::Green);
        assert_eq!(verdict.reason(), "");
    }

    #[test]
    fn test_failed_required_check_rejects() {
        let mut checks = all_required_green();
        checks.push(check("trunk", "trunk / test", "failure"));
        let verdict = policy().evaluate_checks(&checks);
        assert_eq!(verdict.reason(), "trunk checks were not successful");
    }

    #[test]
    fn test_reason_uses_actual_workflow_name() {
        let checks = vec![check("Lint", "Lint / flake8", "cancelled")];
        let verdict = policy().evaluate_checks(&checks);
        assert_eq!(verdict.reason(), "Lint checks were not successful");
    }

    #[test]
    fn test_periodic_failure_rejects() {
        let checks = vec![
            check("Trunk", "trunk / build", "success"),
            check("periodic", "periodic / nightly", "failure"),
        ];
        let verdict = policy().evaluate_checks(&checks);
        assert_eq!(verdict.reason(), "periodic checks were not successful");
    }

    #[test]
    fn test_release_workflows_allow_skipped() {
        let mut checks = all_required_green();
        checks.push(check("docker-release-builds", "docker / push", "skipped"));
        checks.push(check("periodic", "periodic / nightly", "success"));
        assert!(policy().evaluate_checks(&checks).is_green());
    }

    #[test]
    fn test_release_workflow_match_is_exact() {
        let mut checks = all_required_green();
        checks.push(check("periodic-extra", "periodic-extra / job", "failure"));
        checks.push(check("Periodic", "Periodic / job", "failure"));
        assert!(policy().evaluate_checks(&checks).is_green());
    }

    #[test]
    fn test_pending_release_workflow_rejects() {
        let mut checks = all_required_green();
        checks.push(CheckResult {
            conclusion: Conclusion::Pending,
            ..check("docker-release-builds", "docker / push", "success")
        });
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "docker-release-builds checks were not successful"
        );
    }

    #[test]
    fn test_pattern_is_case_insensitive_prefix() {
        let checks: Vec<CheckResult> = REQUIRED
            .iter()
            .map(|w| {
                let workflow = if *w == "lint" { "LINT-extra" } else { w };
                check(workflow, "job", "success")
            })
            .collect();
        assert!(policy().evaluate_checks(&checks).is_green());
    }

    #[test]
    fn test_pattern_does_not_match_mid_name() {
        let checks: Vec<CheckResult> = REQUIRED
            .iter()
            .map(|w| {
                let workflow = if *w == "lint" { "pre-lint" } else { w };
                check(workflow, "job", "success")
            })
            .collect();
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "missing required workflows: lint"
        );
    }

    #[test]
    fn test_broad_prefix_satisfies_multiple_patterns() {
        // "pull-request-extra" counts as "pull"
        let checks: Vec<CheckResult> = REQUIRED
            .iter()
            .map(|w| {
                let workflow = if *w == "pull" { "pull-request-extra" } else { w };
                check(workflow, "job", "success")
            })
            .collect();
        assert!(policy().evaluate_checks(&checks).is_green());
    }

    #[test]
    fn test_tolerated_skip_alone_leaves_pull_missing() {
        let mut checks: Vec<CheckResult> = all_required_green()
            .into_iter()
            .filter(|c| c.workflow_name != "pull")
            .collect();
        checks.push(check("pull", "pull / win-vs2019-cuda11.3-py3", "skipped"));
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "missing required workflows: pull"
        );
    }

    #[test]
    fn test_tolerated_skip_with_other_pull_success_is_green() {
        let mut checks = vec![check("pull", "pull / win-vs2019-cuda11.3-py3", "skipped")];
        checks.extend(all_required_green());
        assert!(policy().evaluate_checks(&checks).is_green());
    }

    #[test]
    fn test_tolerance_requires_matching_conclusion() {
        let mut checks = all_required_green();
        checks.push(check("pull", "pull / win-vs2019-cuda11.3-py3", "failure"));
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "pull checks were not successful"
        );
    }

    #[test]
    fn test_other_skipped_pull_check_rejects() {
        let mut checks = all_required_green();
        checks.push(check("pull", "pull / linux-bionic-py3.7", "skipped"));
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "pull checks were not successful"
        );
    }

    #[test]
    fn test_first_disqualifying_check_wins() {
        let checks = vec![
            check("periodic", "periodic / a", "failure"),
            check("trunk", "trunk / b", "failure"),
        ];
        assert_eq!(
            policy().evaluate_checks(&checks).reason(),
            "periodic checks were not successful"
        );
    }

    #[test]
    fn test_evaluate_only_considers_target_commit() {
        let mut results = CheckResults {
            results: all_required_green(),
        };
        results.results.push(CheckResult {
            sha: "other".to_string(),
            ..check("trunk", "trunk / test", "failure")
        });
        assert!(policy().evaluate("abc", &results).is_green());
        assert!(!policy().evaluate("other", &results).is_green());
    }

    #[test]
    fn test_custom_required_workflows() {
        let config = PolicyConfig {
            required_workflows: vec!["pull".to_string()],
            ..PolicyConfig::default()
        };
        let policy = GreenPolicy::new(&config).unwrap();
        assert!(policy
            .evaluate_checks(&[check("pull", "pull / x", "success")])
            .is_green());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = PolicyConfig {
            required_workflows: vec!["pull(".to_string()],
            ..PolicyConfig::default()
        };
        assert!(matches!(
            GreenPolicy::new(&config),
            Err(AppError::Policy(_))
        ));
    }

    #[test]
    fn test_empty_required_set_is_rejected() {
        let config = PolicyConfig {
            required_workflows: Vec::new(),
            ..PolicyConfig::default()
        };
        assert!(GreenPolicy::new(&config).is_err());
    }
}
