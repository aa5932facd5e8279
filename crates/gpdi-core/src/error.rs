//! Error types for Gpd-i.

use crate::retrieval::NotFound;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole workspace.
///
/// Every failure the orchestrator can observe maps onto one of these variants,
/// so the front end can decide how to present it without inspecting strings.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GpdiError {
    /// A durable record exists but could not be parsed.
    #[error("Corrupt store at {path}: {message}")]
    CorruptStore { path: String, message: String },

    /// The translation service could not be reached or returned garbage.
    #[error("Translation error: {0}")]
    Translation(String),

    /// No answer could be produced by the fallback retriever.
    #[error("Not found: {0}")]
    NotFound(NotFound),

    /// A session identity that is not known to the session index.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any work was done.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GpdiError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a CorruptStore error
    pub fn corrupt_store(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptStore {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(reason: NotFound) -> Self {
        Self::NotFound(reason)
    }

    /// Creates a SessionNotFound error
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound(id.into())
    }

    /// Creates a Translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a SessionNotFound error
    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_))
    }

    /// Check if this is a CorruptStore error
    pub fn is_corrupt_store(&self) -> bool {
        matches!(self, Self::CorruptStore { .. })
    }

    /// Check if this is a Translation error
    pub fn is_translation(&self) -> bool {
        matches!(self, Self::Translation(_))
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<NotFound> for GpdiError {
    fn from(reason: NotFound) -> Self {
        Self::NotFound(reason)
    }
}

impl From<std::io::Error> for GpdiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GpdiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GpdiError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for GpdiError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, GpdiError>`.
pub type Result<T> = std::result::Result<T, GpdiError>;
