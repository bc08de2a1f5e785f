//! Scripted mock backends for tests.
//!
//! Each mock returns a fixed script and counts invocations, so tests
//! can assert both the produced output and that an upstream was (or
//! was not) called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mnema_core::{
    DetectedLabel, Error, GenerationBackend, PerceptionBackend, Result, SpeechBackend,
    TranscriptionJob,
};

/// Generation backend that replays scripted replies in order. Once the
/// script is exhausted the last reply repeats. An empty script fails
/// every call.
pub struct MockGeneration {
    replies: Mutex<Vec<Result<String>>>,
    calls: AtomicUsize,
    model: String,
}

impl MockGeneration {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            model: "mock-model".to_string(),
        }
    }

    /// Always reply with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().with_reply(text)
    }

    /// Always fail with an upstream error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new().with_error(message)
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .expect("reply script poisoned")
            .push(Ok(text.into()));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .expect("reply script poisoned")
            .push(Err(Error::Upstream(message.into())));
        self
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGeneration {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let replies = self.replies.lock().expect("reply script poisoned");
        match replies.get(index).or_else(|| replies.last()) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err(Error::Upstream(e.to_string())),
            None => Err(Error::Upstream("Mock generation has no script".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Perception backend returning fixed text lines and labels.
pub struct MockPerception {
    lines: Vec<String>,
    labels: Vec<DetectedLabel>,
    fail_text: bool,
    fail_labels: bool,
    calls: AtomicUsize,
}

impl MockPerception {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            labels: Vec::new(),
            fail_text: false,
            fail_labels: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_text_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_labels(mut self, labels: Vec<DetectedLabel>) -> Self {
        self.labels = labels;
        self
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn failing_labels(mut self) -> Self {
        self.fail_labels = true;
        self
    }

    /// Total detect calls (text and labels combined).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPerception {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PerceptionBackend for MockPerception {
    async fn detect_text(&self, _image: &[u8]) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_text {
            return Err(Error::Upstream("Mock text detection failure".to_string()));
        }
        Ok(self.lines.clone())
    }

    async fn detect_labels(&self, _image: &[u8]) -> Result<Vec<DetectedLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_labels {
            return Err(Error::Upstream("Mock label detection failure".to_string()));
        }
        Ok(self.labels.clone())
    }
}

/// Speech backend replaying a scripted sequence of job states. The
/// first state answers `start_transcription`; later states answer
/// successive `get_transcription` polls.
pub struct MockSpeech {
    states: Mutex<Vec<TranscriptionJob>>,
    calls: AtomicUsize,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_state(self, job: TranscriptionJob) -> Self {
        self.states
            .lock()
            .expect("job script poisoned")
            .push(job);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_state(&self) -> Result<TranscriptionJob> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let states = self.states.lock().expect("job script poisoned");
        states
            .get(index)
            .or_else(|| states.last())
            .cloned()
            .ok_or_else(|| Error::Upstream("Mock speech has no script".to_string()))
    }
}

impl Default for MockSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for MockSpeech {
    async fn start_transcription(&self, _storage_key: &str) -> Result<TranscriptionJob> {
        self.next_state()
    }

    async fn get_transcription(&self, _job_id: &str) -> Result<TranscriptionJob> {
        self.next_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::TranscriptionStatus;

    #[tokio::test]
    async fn test_mock_generation_replays_then_repeats_last() {
        let backend = MockGeneration::new().with_reply("first").with_reply("second");
        assert_eq!(backend.generate("p").await.unwrap(), "first");
        assert_eq!(backend.generate("p").await.unwrap(), "second");
        assert_eq!(backend.generate("p").await.unwrap(), "second");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_generation_empty_script_fails() {
        let backend = MockGeneration::new();
        assert!(backend.generate("p").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_perception_counts_both_halves() {
        let backend = MockPerception::new().with_text_lines(vec!["STOP".to_string()]);
        backend.detect_text(b"img").await.unwrap();
        backend.detect_labels(b"img").await.unwrap();
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_speech_advances_through_states() {
        let backend = MockSpeech::new()
            .with_state(TranscriptionJob {
                job_id: "j1".to_string(),
                status: TranscriptionStatus::InProgress,
                transcript: None,
            })
            .with_state(TranscriptionJob {
                job_id: "j1".to_string(),
                status: TranscriptionStatus::Failed,
                transcript: None,
            });

        let first = backend.start_transcription("key").await.unwrap();
        assert_eq!(first.status, TranscriptionStatus::InProgress);
        let second = backend.get_transcription("j1").await.unwrap();
        assert_eq!(second.status, TranscriptionStatus::Failed);
    }
}
