use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::RocksetConfig;
use crate::error::{AppError, Result};
use crate::source::types::CheckResults;
use crate::source::CheckResultSource;

/// Check results served by a versioned Rockset query lambda.
pub struct RocksetCheckSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RocksetCheckSource {
    pub fn new(config: &RocksetConfig, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint(),
            api_key: api_key.to_string(),
        }
    }

    /// Build a source using the configured key or `ROCKSET_API_KEY`.
    pub fn from_config(config: &RocksetConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(config, &api_key))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CheckResultSource for RocksetCheckSource {
    async fn fetch_checks(&self, commits: &[String]) -> Result<CheckResults> {
        let request = LambdaRequest::for_commits(commits)?;

        tracing::info!(
            endpoint = %self.endpoint,
            commits = commits.len(),
            "Querying check results"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::QueryService(format!(
                "API returned {status}: {body}"
            )));
        }

        let body = response.json::<CheckResults>().await?;
        tracing::debug!(records = body.results.len(), "Received check results");
        Ok(body)
    }
}

// --- Request types ---

#[derive(Debug, Serialize)]
struct LambdaRequest {
    parameters: Vec<LambdaParameter>,
}

#[derive(Debug, Serialize)]
struct LambdaParameter {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

impl LambdaRequest {
    fn for_commits(commits: &[String]) -> Result<Self> {
        if commits.is_empty() {
            return Err(AppError::QueryService(
                "Refusing to query check results for an empty commit set".to_string(),
            ));
        }
        Ok(Self {
            parameters: vec![LambdaParameter {
                name: "shas".to_string(),
                kind: "string".to_string(),
                value: commits.join(","),
            }],
        })
    }
}
