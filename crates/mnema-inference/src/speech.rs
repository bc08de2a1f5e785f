//! HTTP speech backend for asynchronous transcription jobs.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use mnema_core::{defaults, Error, Result, SpeechBackend, TranscriptionJob};

/// Backend for a transcription service that manages its own jobs.
///
/// `POST /v1/jobs` starts a job for a stored object; the service reads
/// the audio directly from shared storage by key. `GET /v1/jobs/{id}`
/// reports progress. Both answer with the job document, so a short
/// clip may come back completed from the start call alone.
pub struct HttpSpeechBackend {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpSpeechBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            timeout_secs: defaults::SPEECH_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_SPEECH_BASE_URL)
            .unwrap_or_else(|_| defaults::SPEECH_URL.to_string());
        Self::new(base_url)
    }

    async fn decode_job(&self, response: reqwest::Response) -> Result<TranscriptionJob> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound("Transcription job not found".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Speech API returned {}: {}",
                status, body
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse speech response: {}", e)))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartJobRequest<'a> {
    storage_key: &'a str,
}

#[async_trait]
impl SpeechBackend for HttpSpeechBackend {
    async fn start_transcription(&self, storage_key: &str) -> Result<TranscriptionJob> {
        let url = format!("{}/v1/jobs", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&StartJobRequest { storage_key })
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Speech request failed: {}", e)))?;

        let job = self.decode_job(response).await?;
        debug!(job_id = %job.job_id, status = ?job.status, "Transcription job started");
        Ok(job)
    }

    async fn get_transcription(&self, job_id: &str) -> Result<TranscriptionJob> {
        let url = format!("{}/v1/jobs/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Speech request failed: {}", e)))?;

        self.decode_job(response).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::TranscriptionStatus;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_start_sends_storage_key_camel_case() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/jobs"))
            .and(body_json(serde_json::json!({ "storageKey": "audio-key" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "jobId": "job-1",
                    "status": "IN_PROGRESS",
                    "transcript": null
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpSpeechBackend::new(server.uri());
        let job = backend.start_transcription("audio-key").await.unwrap();
        assert_eq!(job.job_id, "job-1");
        assert_eq!(job.status, TranscriptionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_poll_decodes_completed_job() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/jobs/job-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "jobId": "job-1",
                    "status": "COMPLETED",
                    "transcript": {
                        "transcript": "hello there",
                        "confidence": 0.93,
                        "speakers": [],
                        "duration": 2.5,
                        "language": "en"
                    }
                })),
            )
            .mount(&server)
            .await;

        let backend = HttpSpeechBackend::new(server.uri());
        let job = backend.get_transcription("job-1").await.unwrap();
        assert_eq!(job.status, TranscriptionStatus::Completed);
        assert_eq!(job.transcript.unwrap().transcript, "hello there");
    }

    #[tokio::test]
    async fn test_unknown_job_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/jobs/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = HttpSpeechBackend::new(server.uri());
        let err = backend.get_transcription("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/jobs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = HttpSpeechBackend::new(server.uri());
        let err = backend.start_transcription("key").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
