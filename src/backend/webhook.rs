//! ワークフローWebhook通知

use super::{classify_reqwest_error, WorkflowNotifier};
use crate::error::TransportError;
use async_trait::async_trait;
use fleetcheck_common::InspectionRecord;
use std::time::Duration;

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl WorkflowNotifier for WebhookNotifier {
    async fn notify(&self, record: &InspectionRecord) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, "workflow notification", self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "webhook rejected inspection");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(code = %record.inspection_code, "sent to workflow webhook");
        Ok(())
    }
}
