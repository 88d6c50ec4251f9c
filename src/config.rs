use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Environment variable holding the query service API key.
pub const API_KEY_ENV: &str = "ROCKSET_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub rockset: RocksetConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
    /// Reference holding the last known-good commit.
    #[serde(default = "default_marker_ref")]
    pub marker_ref: String,
    /// Glob over remote-tracking refs that make up the mainline.
    #[serde(default = "default_mainline_glob")]
    pub mainline_glob: String,
}

#[derive(Deserialize, Clone)]
pub struct RocksetConfig {
    #[serde(default = "default_api_server")]
    pub api_server: String,
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(default = "default_query_lambda")]
    pub query_lambda: String,
    #[serde(default = "default_lambda_version")]
    pub version: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for RocksetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksetConfig")
            .field("api_server", &self.api_server)
            .field("workspace", &self.workspace)
            .field("query_lambda", &self.query_lambda)
            .field("version", &self.version)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Workflow name patterns that must each see at least one success.
    #[serde(default = "default_required_workflows")]
    pub required_workflows: Vec<String>,
    /// Non-successful checks that do not disqualify a commit.
    #[serde(default = "default_tolerated_checks")]
    pub tolerated_checks: Vec<ToleratedCheck>,
    /// Workflows (exact name) that disqualify a commit unless successful or skipped.
    #[serde(default = "default_release_workflows")]
    pub release_workflows: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ToleratedCheck {
    pub name: String,
    pub conclusion: String,
}

fn default_repo_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_marker_ref() -> String {
    "refs/remotes/origin/viable/strict".to_string()
}

fn default_mainline_glob() -> String {
    "refs/remotes/*origin/master".to_string()
}

fn default_api_server() -> String {
    "api.rs2.usw2.rockset.com".to_string()
}

fn default_workspace() -> String {
    "commons".to_string()
}

fn default_query_lambda() -> String {
    "commit_jobs_batch_query".to_string()
}

fn default_lambda_version() -> String {
    "15aba20837ae9d75".to_string()
}

fn default_required_workflows() -> Vec<String> {
    [
        "pull",
        "trunk",
        "lint",
        "linux-binary",
        "android-tests",
        "windows-binary",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_tolerated_checks() -> Vec<ToleratedCheck> {
    // trunk runs the same tests, so this pull job may be skipped
    vec![ToleratedCheck {
        name: "pull / win-vs2019-cuda11.3-py3".to_string(),
        conclusion: "skipped".to_string(),
    }]
}

fn default_release_workflows() -> Vec<String> {
    vec!["periodic".to_string(), "docker-release-builds".to_string()]
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            repo_path: default_repo_path(),
            marker_ref: default_marker_ref(),
            mainline_glob: default_mainline_glob(),
        }
    }
}

impl Default for RocksetConfig {
    fn default() -> Self {
        Self {
            api_server: default_api_server(),
            workspace: default_workspace(),
            query_lambda: default_query_lambda(),
            version: default_lambda_version(),
            api_key: None,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            required_workflows: default_required_workflows(),
            tolerated_checks: default_tolerated_checks(),
            release_workflows: default_release_workflows(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("viable-commit").required(false));
        }

        // Environment variable overrides, e.g. VIABLE_COMMIT_GIT__REPO_PATH
        builder = builder.add_source(
            config::Environment::with_prefix("VIABLE_COMMIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

impl RocksetConfig {
    /// The configured API key, falling back to `ROCKSET_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        std::env::var(API_KEY_ENV)
            .map_err(|_| AppError::Config(format!("{API_KEY_ENV} is not set")))
    }

    /// Execution endpoint of the configured query lambda version.
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/v1/orgs/self/ws/{}/lambdas/{}/versions/{}",
            self.api_server, self.workspace, self.query_lambda, self.version
        )
    }
}
