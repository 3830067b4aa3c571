//! Loki HTTP client

use crate::batch::PushRequest;
use crate::error::ShipError;
use std::time::Duration;
use tracing::debug;

const PUSH_PATH: &str = "/loki/api/v1/push";

/// Thin wrapper around `reqwest::Client` for the push endpoint
pub struct LokiClient {
    http: reqwest::Client,
    push_url: String,
}

impl LokiClient {
    /// Create a client for the Loki instance at `base_url`
    ///
    /// # Arguments
    /// * `base_url` - e.g. `http://localhost:3100` (trailing `/` tolerated)
    /// * `timeout` - Upper bound for one whole push request
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ShipError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ShipError::Client)?;

        Ok(Self {
            http,
            push_url: format!("{}{}", base_url.trim_end_matches('/'), PUSH_PATH),
        })
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    /// POST one push request; any non-2xx status is an error
    pub async fn push(&self, request: &PushRequest) -> Result<(), ShipError> {
        let body = serde_json::to_vec(request)?;
        debug!(url = %self.push_url, bytes = body.len(), "Pushing to Loki");

        let response = self
            .http
            .post(&self.push_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ShipError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShipError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
