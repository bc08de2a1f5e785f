//! # mnema-core
//!
//! Core types, traits, and abstractions for the mnema knowledge base.
//!
//! This crate provides the foundational data structures, the error
//! taxonomy, and the collaborator trait definitions that other mnema
//! crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
