//! Flat brute-force scoring of an image embedding against the label bank.
//!
//! Computes dot products between a single image embedding and every label
//! embedding, scales them by the logit scale, and turns them into a
//! probability distribution with a softmax.

use crate::config::ScoringConfig;
use crate::embedding::Embedding;
use crate::error::ClassifyError;
use crate::math::softmax;
use crate::types::ProbabilityDistribution;

use super::label_bank::LabelBank;
use super::vocabulary::LabelVocabulary;

/// Turns cosine similarities into probabilities.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    logit_scale: f32,
}

impl SimilarityScorer {
    pub fn new(logit_scale: f32) -> Self {
        Self { logit_scale }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.logit_scale)
    }

    pub fn logit_scale(&self) -> f32 {
        self.logit_scale
    }

    /// Score an image embedding against a label bank built for `vocabulary`.
    ///
    /// Both sides are L2-normalized, so the dot product is the cosine
    /// similarity.
    pub fn score(
        &self,
        image_embedding: &[f32],
        label_bank: &LabelBank,
        vocabulary: &LabelVocabulary,
    ) -> Result<ProbabilityDistribution, ClassifyError> {
        let n = label_bank.term_count();
        let dim = label_bank.embedding_dim();

        if n != vocabulary.len() {
            return Err(ClassifyError::DimensionMismatch {
                context: "label count",
                expected: vocabulary.len(),
                actual: n,
            });
        }
        if image_embedding.len() != dim {
            return Err(ClassifyError::DimensionMismatch {
                context: "image embedding",
                expected: dim,
                actual: image_embedding.len(),
            });
        }

        let logits: Vec<f32> = label_bank
            .matrix()
            .chunks_exact(dim)
            .map(|row| {
                let cosine: f32 = row.iter().zip(image_embedding).map(|(a, b)| a * b).sum();
                self.logit_scale * cosine
            })
            .collect();

        ProbabilityDistribution::new(vocabulary, softmax(&logits))
    }

    /// Score against loose label embeddings, checking their shape first.
    pub fn score_embeddings(
        &self,
        image_embedding: &[f32],
        label_embeddings: &[Embedding],
        vocabulary: &LabelVocabulary,
    ) -> Result<ProbabilityDistribution, ClassifyError> {
        let bank = LabelBank::from_embeddings(label_embeddings.to_vec())?;
        self.score(image_embedding, &bank, vocabulary)
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}
