//! Enterprise WeChat (WeCom) webhook notification channel.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use aflow_core::NotificationChannel;

/// Pushes markdown messages to a WeCom group robot webhook.
pub struct WecomChannel {
    client: reqwest::Client,
    webhook_url: String,
}

#[derive(Debug, Deserialize)]
struct WecomResponse {
    errcode: i64,
    errmsg: Option<String>,
}

impl WecomChannel {
    /// Creates a channel for the given robot webhook URL.
    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            webhook_url,
        }
    }
}

#[async_trait]
impl NotificationChannel for WecomChannel {
    async fn send(&self, subject: &str, content: &str) -> Result<()> {
        let message = serde_json::json!({
            "msgtype": "markdown",
            "markdown": { "content": format!("### {subject}\n{content}") },
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await
            .context("WeCom webhook request failed")?
            .error_for_status()
            .context("WeCom webhook rejected the request")?;

        let payload: WecomResponse = response
            .json()
            .await
            .context("Invalid WeCom webhook response")?;

        if payload.errcode != 0 {
            return Err(anyhow!(
                "WeCom webhook returned {}: {}",
                payload.errcode,
                payload.errmsg.unwrap_or_default()
            ));
        }
        Ok(())
    }
}
