//! Error types for Stylescope.
//!
//! Classification errors surface verbatim to the caller; the only silent
//! recovery in the library is the accelerator-to-CPU fallback performed when
//! an embedding provider resolves its compute device. Download errors belong
//! to the image acquisition collaborator and never reach classification.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Stylescope operations.
#[derive(Error, Debug)]
pub enum StyleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Classification errors
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Image acquisition errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while embedding, scoring or classifying an image.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The image could not be read or decoded
    #[error("Cannot load image {path}: {message}")]
    ImageLoad { path: PathBuf, message: String },

    /// The embedding model or its compute context could not be initialized or run
    #[error("Model unavailable: {message}")]
    ModelUnavailable { message: String },

    /// Embeddings handed to the scorer do not line up
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The label vocabulary violates its construction invariants
    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// Classification did not finish within the caller's deadline
    #[error("Classification of {path} timed out after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },
}

impl ClassifyError {
    pub(crate) fn image_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ImageLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn model(message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
        }
    }
}

/// Errors from fetching sample images over HTTP.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The server answered with a non-success status
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request failed before a usable response arrived
    #[error("GET {url} failed: {message}")]
    Http { url: String, message: String },

    /// The response body could not be written to disk
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Stylescope results.
pub type Result<T> = std::result::Result<T, StyleError>;

/// Convenience type alias for classification results.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;
