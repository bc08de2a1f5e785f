//! # mnema-inference
//!
//! External model backends for mnema:
//! - Ollama-compatible text generation
//! - HTTP perception sidecar (image text and label detection)
//! - HTTP speech service (asynchronous transcription jobs)
//! - In-memory metadata/object/identity collaborators for tests and
//!   local single-process deployments
//! - Scripted mocks for pipeline and API tests
//!
//! # Example
//!
//! ```rust,no_run
//! use mnema_core::GenerationBackend;
//! use mnema_inference::OllamaGenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaGenerationBackend::from_env();
//!     let reply = backend.generate("Say hello").await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

pub mod generation;
pub mod memory;
pub mod mock;
pub mod perception;
pub mod speech;

pub use generation::OllamaGenerationBackend;
pub use memory::{MemoryMetadataStore, MemoryObjectStorage, StaticTokenIdentity};
pub use mock::{MockGeneration, MockPerception, MockSpeech};
pub use perception::HttpPerceptionBackend;
pub use speech::HttpSpeechBackend;
