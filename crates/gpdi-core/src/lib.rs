//! Domain layer for Gpd-i.
//!
//! Holds the knowledge base and its fuzzy matcher, the session model, the
//! contracts of the external collaborators (translation, fallback search) and
//! the configuration model. Nothing in here performs I/O; storage and network
//! live in `gpdi-infrastructure` and `gpdi-interaction`.

pub mod config;
pub mod error;
pub mod knowledge;
pub mod language;
pub mod retrieval;
pub mod session;

// Re-export common error type
pub use error::{GpdiError, Result};
