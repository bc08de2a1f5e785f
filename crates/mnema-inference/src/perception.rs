//! HTTP perception backend for image text and label detection.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use mnema_core::{defaults, DetectedLabel, Error, PerceptionBackend, Result};

/// Backend for a perception sidecar exposing `/v1/detect/text` and
/// `/v1/detect/labels`. Images travel base64-encoded in a JSON body.
pub struct HttpPerceptionBackend {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpPerceptionBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            timeout_secs: defaults::PERCEPTION_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_PERCEPTION_BASE_URL)
            .unwrap_or_else(|_| defaults::PERCEPTION_URL.to_string());
        Self::new(base_url)
    }

    async fn post_detect<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        image: &[u8],
    ) -> Result<T> {
        let request = DetectRequest {
            image: base64::engine::general_purpose::STANDARD.encode(image),
        };

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Perception request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Perception API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse perception response: {}", e)))
    }
}

#[derive(Serialize)]
struct DetectRequest {
    image: String, // base64 encoded
}

#[derive(Deserialize)]
struct TextResponse {
    lines: Vec<String>,
}

#[derive(Deserialize)]
struct LabelResponse {
    labels: Vec<DetectedLabel>,
}

#[async_trait]
impl PerceptionBackend for HttpPerceptionBackend {
    async fn detect_text(&self, image: &[u8]) -> Result<Vec<String>> {
        let result: TextResponse = self.post_detect("/v1/detect/text", image).await?;
        Ok(result.lines)
    }

    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<DetectedLabel>> {
        let result: LabelResponse = self.post_detect("/v1/detect/labels", image).await?;
        Ok(result.labels)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
