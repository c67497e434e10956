use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::notify::RunReport;

#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn send(&self, report: &RunReport) -> Result<()>;
}

pub struct StdoutSink;

#[async_trait]
impl NotifySink for StdoutSink {
    async fn send(&self, report: &RunReport) -> Result<()> {
        println!("{}\n{}", report.subject(), report.body());
        Ok(())
    }
}

pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("tracker-sync/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build webhook HTTP client");
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotifySink for WebhookSink {
    async fn send(&self, report: &RunReport) -> Result<()> {
        let req = if self.url.contains("discord.com/api/webhooks")
            || self.url.contains("discordapp.com/api/webhooks")
        {
            let content = format!("{}\n{}", report.subject(), report.body());
            self.client
                .post(&self.url)
                .json(&serde_json::json!({ "content": content }))
        } else {
            self.client.post(&self.url).json(report)
        };

        req.send().await?.error_for_status()?;
        Ok(())
    }
}
