//! Stylescope Core - zero-shot fashion style classification.
//!
//! Stylescope scores an image against an ordered vocabulary of style labels
//! ("goth style", "kawaii style", ...) with a joint vision-language embedding
//! model and returns either the full probability distribution or the single
//! dominant label.
//!
//! # Architecture
//!
//! ```text
//! Image → Decode → Embed (CLIP) ─┐
//!                                ├→ Cosine × logit scale → Softmax → Result
//! Labels → Embed (CLIP, cached) ─┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use stylescope_core::{ClassificationEngine, Classifier, ClassifyMode, ClipProvider, Config};
//!
//! let config = Config::load()?;
//! let engine = ClassificationEngine::new(ClipProvider::load(&config)?, &config.scoring);
//! let vocabulary = config.label_vocabulary()?;
//!
//! let result = engine.classify("look.jpg".as_ref(), &vocabulary, ClassifyMode::DominantLabel)?;
//! println!("{}", result.as_label().unwrap());
//! ```

pub mod acquire;
pub mod classify;
pub mod config;
pub mod embedding;
pub mod error;
pub mod math;
pub mod output;
pub mod trends;
pub mod types;

pub use acquire::{FetchReport, ImageFetcher};
pub use classify::{
    classify_with_timeout, ClassificationEngine, Classifier, Label, LabelVocabulary, MockEngine,
    SimilarityScorer,
};
pub use config::Config;
pub use embedding::{ClipProvider, Device, DevicePreference, Embedding, EmbeddingProvider};
pub use error::{
    ClassifyError, ClassifyResult, ConfigError, DownloadError, Result, StyleError,
};
pub use output::OutputWriter;
pub use types::{ClassificationResult, ClassifyMode, ProbabilityDistribution};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
