//! Pre-computed label embeddings for fast scoring.
//!
//! The label bank stores a flat N×D matrix of text embeddings, one row per
//! vocabulary label in vocabulary order, that is dot-producted against image
//! embeddings.

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::ClassifyError;

use super::vocabulary::LabelVocabulary;

/// Pre-computed label embeddings for scoring.
///
/// Stores a single flat matrix (N × D, row-major) for efficient dot product.
#[derive(Debug, Clone)]
pub struct LabelBank {
    /// Flat matrix: N × D stored row-major.
    matrix: Vec<f32>,
    embedding_dim: usize,
    term_count: usize,
}

impl LabelBank {
    /// Build a bank from per-label embeddings, rejecting ragged rows.
    pub fn from_embeddings(embeddings: Vec<Embedding>) -> Result<Self, ClassifyError> {
        let embedding_dim = embeddings.first().map(Vec::len).unwrap_or(0);
        if embedding_dim == 0 {
            return Err(ClassifyError::model("Label embeddings are empty"));
        }

        let term_count = embeddings.len();
        let mut matrix = Vec::with_capacity(term_count * embedding_dim);
        for embedding in &embeddings {
            if embedding.len() != embedding_dim {
                return Err(ClassifyError::DimensionMismatch {
                    context: "label embedding",
                    expected: embedding_dim,
                    actual: embedding.len(),
                });
            }
            matrix.extend_from_slice(embedding);
        }

        Ok(Self {
            matrix,
            embedding_dim,
            term_count,
        })
    }

    /// Encode every label of `vocabulary` with `provider` in one batch.
    pub fn encode<P>(vocabulary: &LabelVocabulary, provider: &P) -> Result<Self, ClassifyError>
    where
        P: EmbeddingProvider + ?Sized,
    {
        tracing::debug!("Encoding {} labels", vocabulary.len());
        let embeddings = provider.embed_texts(vocabulary.labels())?;
        if embeddings.len() != vocabulary.len() {
            return Err(ClassifyError::DimensionMismatch {
                context: "label count",
                expected: vocabulary.len(),
                actual: embeddings.len(),
            });
        }

        let bank = Self::from_embeddings(embeddings)?;
        tracing::debug!(
            "Label bank ready: {} labels x {} dims",
            bank.term_count,
            bank.embedding_dim
        );
        Ok(bank)
    }

    /// Get the flat matrix for batch dot product.
    pub fn matrix(&self) -> &[f32] {
        &self.matrix
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Embedding row of the label at `index`.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.embedding_dim)?;
        self.matrix.get(start..start + self.embedding_dim)
    }
}
