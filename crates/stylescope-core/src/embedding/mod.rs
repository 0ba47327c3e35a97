//! Joint image/text embedding.
//!
//! [`EmbeddingProvider`] is the seam between classification and the model:
//! anything that can place images and labels in one shared, L2-normalized
//! space can drive the engine. [`ClipProvider`] is the real implementation,
//! a CLIP ViT-B/32 running locally through ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stylescope_core::embedding::{ClipProvider, EmbeddingProvider};
//! use stylescope_core::Config;
//!
//! let config = Config::default();
//! let provider = ClipProvider::load(&config)?;
//! let embedding = provider.embed_image("look.jpg".as_ref())?;
//! // embedding is a Vec<f32> with 512 elements
//! ```

pub(crate) mod decode;
pub(crate) mod device;
pub(crate) mod preprocess;
pub(crate) mod projection;
pub(crate) mod text;
pub(crate) mod vision;

use std::path::{Path, PathBuf};

use crate::classify::vocabulary::Label;
use crate::config::Config;
use crate::error::ClassifyError;

pub use self::decode::ImageLoader;
pub use self::device::{Device, DevicePreference};

use self::preprocess::preprocess;
use self::text::ClipTextEncoder;
use self::vision::ClipVisionSession;

/// A fixed-length embedding vector.
pub type Embedding = Vec<f32>;

/// Visual encoder filename inside the model directory.
pub const VISUAL_MODEL_FILENAME: &str = "visual.onnx";
/// Text encoder filename inside the model directory.
pub const TEXT_MODEL_FILENAME: &str = "text_model.onnx";
/// Tokenizer filename inside the model directory.
pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Maps images and labels into one shared embedding space.
///
/// Embeddings from the same provider must be comparable regardless of
/// modality. Implementations own their compute resources and must be safe to
/// share across threads.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed the image stored at `path`.
    fn embed_image(&self, path: &Path) -> Result<Embedding, ClassifyError>;

    /// Embed a single label.
    fn embed_text(&self, label: &Label) -> Result<Embedding, ClassifyError>;

    /// Embed several labels, in order.
    ///
    /// Default implementation calls `embed_text` in a loop.
    /// Providers should override this for batched inference.
    fn embed_texts(&self, labels: &[Label]) -> Result<Vec<Embedding>, ClassifyError> {
        labels.iter().map(|label| self.embed_text(label)).collect()
    }
}

/// CLIP ViT-B/32 provider backed by ONNX Runtime.
pub struct ClipProvider {
    vision: ClipVisionSession,
    text: ClipTextEncoder,
    loader: ImageLoader,
    image_size: u32,
    device: Device,
}

impl ClipProvider {
    /// Load the model files for the configured model.
    ///
    /// Expects `visual.onnx`, `text_model.onnx` and `tokenizer.json` under
    /// `{model_dir}/{model.name}/`. The compute device is resolved here, once.
    pub fn load(config: &Config) -> Result<Self, ClassifyError> {
        let preference = DevicePreference::parse(&config.model.device)
            .map_err(|e| ClassifyError::model(format!("Invalid device: {e}")))?;
        let model_dir = config.model_files_dir();

        for path in Self::model_paths(&model_dir) {
            if !path.exists() {
                return Err(ClassifyError::model(format!(
                    "{:?} not found. Run `stylescope models download` first.",
                    path
                )));
            }
        }

        tracing::info!("Loading CLIP model from {:?}", model_dir);
        let (vision, device) = ClipVisionSession::load(
            &model_dir.join(VISUAL_MODEL_FILENAME),
            preference.resolve(),
        )?;
        let text = ClipTextEncoder::load(
            &model_dir.join(TEXT_MODEL_FILENAME),
            &model_dir.join(TOKENIZER_FILENAME),
            device,
        )?;
        tracing::info!("CLIP model loaded on {}", device);

        Ok(Self {
            vision,
            text,
            loader: ImageLoader::new(config.limits.clone()),
            image_size: config.model.image_size,
            device,
        })
    }

    /// The device inference runs on after resolution and fallback.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Check whether every model file exists on disk.
    pub fn model_exists(config: &Config) -> bool {
        Self::model_paths(&config.model_files_dir())
            .iter()
            .all(|p| p.exists())
    }

    /// Paths of the files a model directory must contain.
    pub fn model_paths(model_dir: &Path) -> [PathBuf; 3] {
        [
            model_dir.join(VISUAL_MODEL_FILENAME),
            model_dir.join(TEXT_MODEL_FILENAME),
            model_dir.join(TOKENIZER_FILENAME),
        ]
    }
}

impl EmbeddingProvider for ClipProvider {
    fn embed_image(&self, path: &Path) -> Result<Embedding, ClassifyError> {
        let start = std::time::Instant::now();
        let image = self.loader.load(path)?;
        let tensor = preprocess(&image, self.image_size);
        drop(image);
        let embedding = self.vision.embed(&tensor)?;
        tracing::debug!("Embedded {:?} in {:?}", path, start.elapsed());
        Ok(embedding)
    }

    fn embed_text(&self, label: &Label) -> Result<Embedding, ClassifyError> {
        self.embed_texts(std::slice::from_ref(label))?
            .into_iter()
            .next()
            .ok_or_else(|| ClassifyError::model("Text encoder returned no embedding"))
    }

    fn embed_texts(&self, labels: &[Label]) -> Result<Vec<Embedding>, ClassifyError> {
        let texts: Vec<String> = labels.iter().map(|l| l.as_str().to_string()).collect();
        self.text.encode_batch(&texts)
    }
}
