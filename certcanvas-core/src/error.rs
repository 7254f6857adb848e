//! Error types for editor operations.
//!
//! Scene mutations never fail: a stale element id or an undo past the start
//! of history is a silent no-op. Errors only arise at the edges of the
//! editor, where documents, configuration files and assets cross in.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur outside the in-memory scene.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template document failed validation.
    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] ValidationError),

    /// Editor configuration is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem error while reading or writing templates or assets.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested template does not exist in storage.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// An asset could not be turned into a URI.
    #[error("Upload failed: {0}")]
    Upload(String),
}
