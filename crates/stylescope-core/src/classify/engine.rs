//! The real classification engine.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::ScoringConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{ClassifyError, ClassifyResult};
use crate::types::ProbabilityDistribution;

use super::label_bank::LabelBank;
use super::scorer::SimilarityScorer;
use super::vocabulary::LabelVocabulary;
use super::Classifier;

/// Number of vocabularies whose label embeddings are kept by default.
pub const DEFAULT_LABEL_CACHE_CAPACITY: usize = 16;

/// Label banks keyed by vocabulary hash, evicting the oldest entry when full.
struct LabelCache {
    banks: HashMap<String, Arc<LabelBank>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl LabelCache {
    fn new(capacity: usize) -> Self {
        Self {
            banks: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, key: &str) -> Option<Arc<LabelBank>> {
        self.banks.get(key).cloned()
    }

    fn insert(&mut self, key: String, bank: Arc<LabelBank>) {
        if self.banks.contains_key(&key) {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.banks.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.banks.insert(key, bank);
    }
}

/// Embeds, scores and normalizes.
///
/// The provider (and with it the compute device) is fixed for the engine's
/// lifetime. Label embeddings are cached per vocabulary content hash, so
/// repeated calls with the same vocabulary only embed the image. The cache
/// holds a bounded number of vocabularies; the oldest is dropped first.
pub struct ClassificationEngine<P> {
    provider: P,
    scorer: SimilarityScorer,
    label_cache: Mutex<LabelCache>,
}

impl<P: EmbeddingProvider> ClassificationEngine<P> {
    pub fn new(provider: P, scoring: &ScoringConfig) -> Self {
        Self::with_cache_capacity(provider, scoring, DEFAULT_LABEL_CACHE_CAPACITY)
    }

    /// Like [`new`](Self::new), keeping at most `capacity` vocabularies.
    pub fn with_cache_capacity(provider: P, scoring: &ScoringConfig, capacity: usize) -> Self {
        Self {
            provider,
            scorer: SimilarityScorer::from_config(scoring),
            label_cache: Mutex::new(LabelCache::new(capacity)),
        }
    }

    /// Number of vocabularies currently cached.
    pub fn cached_vocabularies(&self) -> usize {
        self.label_cache.lock().map(|c| c.banks.len()).unwrap_or(0)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Label embeddings for `vocabulary`, encoding them on first use.
    pub fn label_bank(&self, vocabulary: &LabelVocabulary) -> ClassifyResult<Arc<LabelBank>> {
        let key = vocabulary.content_hash();
        if let Some(bank) = self.cached(&key)? {
            return Ok(bank);
        }

        // Encode outside the lock; a racing thread at worst encodes twice.
        let bank = Arc::new(LabelBank::encode(vocabulary, &self.provider)?);
        self.label_cache
            .lock()
            .map_err(|e| ClassifyError::model(format!("Label cache lock poisoned: {e}")))?
            .insert(key, Arc::clone(&bank));
        Ok(bank)
    }

    fn cached(&self, key: &str) -> ClassifyResult<Option<Arc<LabelBank>>> {
        let cache = self
            .label_cache
            .lock()
            .map_err(|e| ClassifyError::model(format!("Label cache lock poisoned: {e}")))?;
        Ok(cache.get(key))
    }
}

impl<P: EmbeddingProvider> Classifier for ClassificationEngine<P> {
    fn distribution(
        &self,
        image: &Path,
        vocabulary: &LabelVocabulary,
    ) -> ClassifyResult<ProbabilityDistribution> {
        let start = std::time::Instant::now();
        let image_embedding = self.provider.embed_image(image)?;
        let bank = self.label_bank(vocabulary)?;
        let distribution = self.scorer.score(&image_embedding, &bank, vocabulary)?;
        tracing::debug!(
            "Classified {:?} against {} labels in {:?}",
            image,
            vocabulary.len(),
            start.elapsed()
        );
        Ok(distribution)
    }
}
