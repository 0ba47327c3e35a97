//! Zero-shot style classification.
//!
//! Images are scored against a [`LabelVocabulary`] by comparing the image
//! embedding with one text embedding per label. [`ClassificationEngine`] does
//! this with a real [`EmbeddingProvider`](crate::embedding::EmbeddingProvider);
//! [`MockEngine`] fabricates plausible distributions without any model.

pub mod engine;
pub mod label_bank;
pub mod mock;
pub mod scorer;
pub mod vocabulary;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::{ClassifyError, ClassifyResult};
use crate::types::{ClassificationResult, ClassifyMode, ProbabilityDistribution};

pub use engine::{ClassificationEngine, DEFAULT_LABEL_CACHE_CAPACITY};
pub use label_bank::LabelBank;
pub use mock::MockEngine;
pub use scorer::SimilarityScorer;
pub use vocabulary::{Label, LabelVocabulary};

/// Something that can classify an image against a vocabulary.
///
/// The real engine and the mock both implement this, so callers can swap one
/// for the other.
pub trait Classifier: Send + Sync {
    /// Full probability distribution of `image` over `vocabulary`.
    fn distribution(
        &self,
        image: &Path,
        vocabulary: &LabelVocabulary,
    ) -> ClassifyResult<ProbabilityDistribution>;

    /// Classify `image`, reducing the distribution according to `mode`.
    fn classify(
        &self,
        image: &Path,
        vocabulary: &LabelVocabulary,
        mode: ClassifyMode,
    ) -> ClassifyResult<ClassificationResult> {
        let distribution = self.distribution(image, vocabulary)?;
        ClassificationResult::from_distribution(distribution, mode)
    }
}

/// Run a blocking classification on tokio's blocking pool under a deadline.
///
/// The blocking task keeps running to completion in the background if the
/// deadline passes; only the caller stops waiting for it.
pub async fn classify_with_timeout(
    classifier: Arc<dyn Classifier>,
    image: PathBuf,
    vocabulary: Arc<LabelVocabulary>,
    mode: ClassifyMode,
    limit: Duration,
) -> ClassifyResult<ClassificationResult> {
    let task_image = image.clone();
    let result = timeout(limit, async move {
        tokio::task::spawn_blocking(move || classifier.classify(&task_image, &vocabulary, mode))
            .await
    })
    .await;

    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => Err(ClassifyError::model(format!(
            "Classification task failed: {e}"
        ))),
        Err(_) => Err(ClassifyError::Timeout {
            path: image,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
