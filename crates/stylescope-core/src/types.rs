//! Core data types produced by classification.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classify::vocabulary::{Label, LabelVocabulary};
use crate::error::ClassifyError;
use crate::math::argmax;

/// Tolerance allowed on the sum of a probability distribution.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// What a caller wants back from a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMode {
    /// Every label with its probability
    FullDistribution,
    /// Only the most probable label
    #[default]
    DominantLabel,
}

/// Probabilities over a vocabulary, index-aligned with it.
///
/// Serializes as a JSON object whose keys appear in vocabulary order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    labels: Vec<Label>,
    probabilities: Vec<f32>,
}

impl ProbabilityDistribution {
    /// Pair probabilities with the vocabulary they were computed for.
    ///
    /// Rejects vectors whose length differs from the vocabulary, negative or
    /// non-finite entries, and sums that stray from 1.0 by more than
    /// [`SUM_TOLERANCE`].
    pub fn new(
        vocabulary: &LabelVocabulary,
        probabilities: Vec<f32>,
    ) -> Result<Self, ClassifyError> {
        if probabilities.len() != vocabulary.len() {
            return Err(ClassifyError::DimensionMismatch {
                context: "probability vector",
                expected: vocabulary.len(),
                actual: probabilities.len(),
            });
        }
        let distribution = Self {
            labels: vocabulary.labels().to_vec(),
            probabilities,
        };
        if !distribution.is_normalized() {
            return Err(ClassifyError::model(format!(
                "scores do not form a probability distribution (sum = {})",
                distribution.sum()
            )));
        }
        Ok(distribution)
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Probability assigned to a label, if it is part of the vocabulary.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.labels
            .iter()
            .position(|l| l.as_str() == label)
            .map(|i| self.probabilities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, f32)> {
        self.labels.iter().zip(self.probabilities.iter().copied())
    }

    /// The most probable label; ties go to the earliest vocabulary index.
    pub fn dominant(&self) -> Option<&Label> {
        argmax(&self.probabilities).map(|i| &self.labels[i])
    }

    /// Sum of all probabilities, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.probabilities.iter().map(|&p| f64::from(p)).sum()
    }

    /// Whether every entry lies in [0, 1] and the entries sum to 1.
    pub fn is_normalized(&self) -> bool {
        self.probabilities
            .iter()
            .all(|p| p.is_finite() && (0.0..=1.0).contains(p))
            && (self.sum() - 1.0).abs() < SUM_TOLERANCE
    }
}

impl Serialize for ProbabilityDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, p) in self.iter() {
            map.serialize_entry(label.as_str(), &p)?;
        }
        map.end()
    }
}

/// The answer to a classification request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassificationResult {
    /// Full distribution over the vocabulary
    Distribution(ProbabilityDistribution),
    /// The single dominant label
    Dominant(Label),
}

impl ClassificationResult {
    /// Reduce a distribution according to the requested mode.
    pub fn from_distribution(
        distribution: ProbabilityDistribution,
        mode: ClassifyMode,
    ) -> Result<Self, ClassifyError> {
        match mode {
            ClassifyMode::FullDistribution => Ok(Self::Distribution(distribution)),
            ClassifyMode::DominantLabel => distribution
                .dominant()
                .cloned()
                .map(Self::Dominant)
                .ok_or_else(|| {
                    ClassifyError::InvalidVocabulary("cannot pick a label from nothing".into())
                }),
        }
    }

    pub fn as_distribution(&self) -> Option<&ProbabilityDistribution> {
        match self {
            Self::Distribution(d) => Some(d),
            Self::Dominant(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Self::Dominant(l) => Some(l),
            Self::Distribution(_) => None,
        }
    }
}
