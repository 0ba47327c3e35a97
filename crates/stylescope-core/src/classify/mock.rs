//! Synthetic classifier for exercising downstream consumers without a model.
//!
//! Every distribution is built from the same multiset: one dominant value `p`
//! and `(1 - p) / (N - 1)` for each remaining label. The deterministic variant
//! pins `p` to a fixed index; the randomized variant permutes the multiset on
//! every call with an injected RNG.
//!
//! `p` is held in f64 and only the final values are narrowed, so `0.85` over
//! four labels yields exactly `0.05f32` for the rest. A vocabulary for which
//! `p <= 1/N` is rejected, since `p` would no longer be the maximum.

use std::path::Path;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::MockConfig;
use crate::error::{ClassifyError, ClassifyResult};
use crate::types::ProbabilityDistribution;

use super::vocabulary::LabelVocabulary;
use super::Classifier;

enum Arrangement<R> {
    Fixed { dominant_index: usize },
    Shuffled(Mutex<R>),
}

/// Drop-in [`Classifier`] that never looks at the image.
pub struct MockEngine<R = StdRng> {
    dominant_probability: f64,
    arrangement: Arrangement<R>,
}

impl MockEngine<StdRng> {
    /// Same output on every call: `dominant_probability` at `dominant_index`
    /// (clamped to the last label).
    pub fn deterministic(dominant_probability: f64, dominant_index: usize) -> Self {
        Self {
            dominant_probability: dominant_probability.clamp(0.0, 1.0),
            arrangement: Arrangement::Fixed { dominant_index },
        }
    }

    /// Build the variant described by `[mock]`: deterministic unless
    /// `shuffle` is set, in which case the RNG is seeded from `seed` or the OS.
    pub fn from_config(config: &MockConfig, shuffle: bool) -> Self {
        if !shuffle {
            return Self::deterministic(config.dominant_probability, config.dominant_index);
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::randomized(config.dominant_probability, rng)
    }
}

impl<R: Rng + Send> MockEngine<R> {
    /// Permute the multiset uniformly at random on every call.
    pub fn randomized(dominant_probability: f64, rng: R) -> Self {
        Self {
            dominant_probability: dominant_probability.clamp(0.0, 1.0),
            arrangement: Arrangement::Shuffled(Mutex::new(rng)),
        }
    }

    pub fn is_randomized(&self) -> bool {
        matches!(self.arrangement, Arrangement::Shuffled(_))
    }

    pub fn dominant_probability(&self) -> f64 {
        self.dominant_probability
    }

    /// The multiset with the dominant value first.
    fn base_values(&self, n: usize) -> ClassifyResult<Vec<f32>> {
        if n == 1 {
            return Ok(vec![1.0]);
        }
        let p = self.dominant_probability;
        if p <= 1.0 / n as f64 {
            return Err(ClassifyError::InvalidVocabulary(format!(
                "{n} labels leave no dominant value at mock probability {p}"
            )));
        }
        let rest = (1.0 - p) / (n - 1) as f64;
        let mut values = vec![rest as f32; n];
        values[0] = p as f32;
        Ok(values)
    }
}

impl<R: Rng + Send> Classifier for MockEngine<R> {
    fn distribution(
        &self,
        _image: &Path,
        vocabulary: &LabelVocabulary,
    ) -> ClassifyResult<ProbabilityDistribution> {
        let n = vocabulary.len();
        let mut values = self.base_values(n)?;

        match &self.arrangement {
            Arrangement::Fixed { dominant_index } => {
                values.swap(0, (*dominant_index).min(n - 1));
            }
            Arrangement::Shuffled(rng) => {
                let mut rng = rng
                    .lock()
                    .map_err(|e| ClassifyError::model(format!("Mock RNG lock poisoned: {e}")))?;
                values.shuffle(&mut *rng);
            }
        }

        ProbabilityDistribution::new(vocabulary, values)
    }
}
