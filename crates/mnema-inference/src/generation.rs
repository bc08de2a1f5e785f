//! Ollama-compatible text generation backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mnema_core::{defaults, Error, GenerationBackend, Result};

/// HTTP backend for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaGenerationBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaGenerationBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: defaults::GEN_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_GENERATION_BASE_URL)
            .unwrap_or_else(|_| defaults::GENERATION_URL.to_string());
        let model = std::env::var(defaults::ENV_GENERATION_MODEL)
            .unwrap_or_else(|_| defaults::GENERATION_MODEL.to_string());
        Self::new(base_url, model)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl GenerationBackend for OllamaGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Generation request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited("Generation service throttled".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Generation API returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse generation response: {}", e)))?;

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Generation complete"
        );
        Ok(result.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_backend_new() {
        let backend = OllamaGenerationBackend::new(
            "http://localhost:11434".to_string(),
            "qwen3:8b".to_string(),
        );
        assert_eq!(backend.model_name(), "qwen3:8b");
        assert_eq!(backend.timeout_secs, defaults::GEN_TIMEOUT_SECS);
    }

    #[test]
    fn test_generate_request_serialization() {
        let request = GenerateRequest {
            model: "qwen3:8b".to_string(),
            prompt: "hello".to_string(),
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen3:8b");
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "response": "generated text"
                })),
            )
            .mount(&server)
            .await;

        let backend = OllamaGenerationBackend::new(server.uri(), "test-model".to_string());
        let reply = backend.generate("prompt").await.unwrap();
        assert_eq!(reply, "generated text");
    }

    #[tokio::test]
    async fn test_generate_rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = OllamaGenerationBackend::new(server.uri(), "test-model".to_string());
        let err = backend.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_generate_server_error_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = OllamaGenerationBackend::new(server.uri(), "test-model".to_string());
        let err = backend.generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_health_check_down_server() {
        let backend = OllamaGenerationBackend::new(
            "http://127.0.0.1:1".to_string(),
            "test-model".to_string(),
        );
        assert!(!backend.health_check().await.unwrap());
    }
}
