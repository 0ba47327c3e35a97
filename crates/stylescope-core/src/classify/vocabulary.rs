//! Style label vocabulary.
//!
//! A vocabulary is the ordered, duplicate-free list of labels an image is
//! classified against. Its order fixes the index order of every probability
//! vector produced for it.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// An immutable style label such as `"goth style"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An ordered, non-empty set of unique labels, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<Label>,
}

impl LabelVocabulary {
    /// Build a vocabulary, rejecting empty input and duplicate labels.
    pub fn new<I, L>(labels: I) -> Result<Self, ClassifyError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ClassifyError::InvalidVocabulary(
                "vocabulary must contain at least one label".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.as_str().trim().is_empty() {
                return Err(ClassifyError::InvalidVocabulary(
                    "labels must not be blank".into(),
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(ClassifyError::InvalidVocabulary(format!(
                    "duplicate label {:?}",
                    label.as_str()
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Load a vocabulary from a text file with one label per line.
    ///
    /// Blank lines and lines starting with `#` are skipped; surrounding
    /// whitespace is trimmed.
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifyError::InvalidVocabulary(format!("Failed to read {:?}: {}", path, e))
        })?;
        let vocabulary = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )?;
        tracing::debug!("Loaded {} labels from {:?}", vocabulary.len(), path);
        Ok(vocabulary)
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    /// Position of a label in vocabulary order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.as_str() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    /// Compute a BLAKE3 hash of all labels in order.
    ///
    /// Keys the engine's label embedding cache: two vocabularies with the same
    /// labels in the same order share embeddings.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for label in &self.labels {
            hasher.update(label.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl<'a> IntoIterator for &'a LabelVocabulary {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}
