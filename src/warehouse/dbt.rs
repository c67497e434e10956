use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// dbt Cloud job trigger used by the `--refresh-warehouse` switch: fire the
/// run, then sleep a fixed settle window so the report tables are rebuilt
/// before they are queried. No polling; the settle window is the contract.
pub struct DbtTrigger {
    job_url: String,
    token: String,
    settle_secs: u64,
}

impl DbtTrigger {
    pub fn new(job_url: impl Into<String>, token: impl Into<String>, settle_secs: u64) -> Self {
        Self {
            job_url: job_url.into(),
            token: token.into(),
            settle_secs,
        }
    }

    pub async fn trigger_and_settle(&self, http: &Client) -> Result<()> {
        let response = http
            .post(&self.job_url)
            .header("Authorization", format!("Token {}", self.token))
            .json(&json!({ "cause": "tracker-sync refresh" }))
            .send()
            .await
            .with_context(|| format!("failed triggering dbt job: {}", self.job_url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(180).collect();
            return Err(anyhow!("dbt trigger returned {status}: {preview}"));
        }
        info!(
            "triggered upstream refresh; settling for {}s",
            self.settle_secs
        );
        tokio::time::sleep(Duration::from_secs(self.settle_secs)).await;
        Ok(())
    }
}
