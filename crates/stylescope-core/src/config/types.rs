//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.stylescope/models"),
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name; also the subdirectory of `model_dir` holding its files
    pub name: String,

    /// Square input size the vision encoder expects
    pub image_size: u32,

    /// Inference device: "auto", "cpu", "cuda" or "cuda:<id>".
    /// Accelerator failures fall back to the CPU.
    pub device: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "clip-vit-base-patch32".to_string(),
            image_size: 224,
            device: "auto".to_string(),
        }
    }
}

/// Similarity scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Multiplier applied to cosine similarities before the softmax.
    /// CLIP ViT-B/32 was trained with a logit scale of 100.
    pub logit_scale: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { logit_scale: 100.0 }
    }
}

/// Label vocabulary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Style labels, in output order
    pub labels: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            labels: [
                "chic style",
                "goth style",
                "kawaii style",
                "vintage style",
                "punk style",
                "avante-garde style",
                "grunge style",
                "emo style",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Timeout around a single classification in milliseconds
    pub embed_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            embed_timeout_ms: 30000,
        }
    }
}

/// Mock classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Probability given to the dominant label; the rest is split evenly
    pub dominant_probability: f64,

    /// Vocabulary index that receives the dominant probability in the
    /// deterministic variant (clamped to the last label)
    pub dominant_index: usize,

    /// Seed for the randomized variant; OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dominant_probability: 0.85,
            dominant_index: 1,
            seed: None,
        }
    }
}

/// Sample image acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Source image URLs, fetched in order
    pub urls: Vec<String>,

    /// Local filename base; files are written as `<prefix>_<index>.jpg`
    pub output_prefix: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            urls: vec![],
            output_prefix: "local_image".to_string(),
            timeout_ms: 30000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
