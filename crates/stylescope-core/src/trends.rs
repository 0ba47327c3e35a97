//! Style trends over time.
//!
//! Aggregates classified records (`{"createdAt": ..., "style": ...}`) into
//! per-date label counts and per-year summaries naming the dominant style.

use std::collections::BTreeMap;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classify::vocabulary::{Label, LabelVocabulary};
use crate::error::Result;

/// One classified post.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleRecord {
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default)]
    pub style: Option<String>,
}

/// Read a JSON array of [`StyleRecord`]s.
pub fn load_records(path: &Path) -> Result<Vec<StyleRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Count per vocabulary label, serialized in vocabulary order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleCounts {
    labels: Vec<Label>,
    counts: Vec<u64>,
}

impl StyleCounts {
    fn zeroed(vocabulary: &LabelVocabulary) -> Self {
        Self {
            labels: vocabulary.labels().to_vec(),
            counts: vec![0; vocabulary.len()],
        }
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.labels
            .iter()
            .position(|l| l.as_str() == label)
            .map(|i| self.counts[i])
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Most frequent label; ties go to the earliest vocabulary index.
    pub fn dominant(&self) -> Option<(&Label, u64)> {
        let mut best: Option<usize> = None;
        for (i, &count) in self.counts.iter().enumerate() {
            if count > best.map_or(0, |b| self.counts[b]) {
                best = Some(i);
            }
        }
        best.map(|i| (&self.labels[i], self.counts[i]))
    }

    fn add(&mut self, other: &StyleCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
    }
}

impl Serialize for StyleCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for (label, count) in self.labels.iter().zip(&self.counts) {
            map.serialize_entry(label.as_str(), count)?;
        }
        map.end()
    }
}

/// Summary of one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStats {
    pub total: u64,
    pub dominant_style: Option<Label>,
    /// Share of the dominant style in percent, one decimal
    pub percentage: f64,
}

/// Aggregated trends, keyed by date string and by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub counts_by_date: BTreeMap<String, StyleCounts>,
    pub yearly: BTreeMap<String, YearlyStats>,
}

/// Year of a date such as `"Mon Jan 2024"`: the third whitespace-separated
/// token, or the last one for shorter dates.
pub fn year_of(date: &str) -> &str {
    let mut tokens = date.split_whitespace();
    tokens
        .clone()
        .nth(2)
        .or_else(|| tokens.next_back())
        .unwrap_or("")
}

/// Aggregate `records` against `vocabulary`.
///
/// Records without a style still create their date bucket. Styles outside the
/// vocabulary are skipped.
pub fn summarize(records: &[StyleRecord], vocabulary: &LabelVocabulary) -> TrendReport {
    let mut counts_by_date: BTreeMap<String, StyleCounts> = BTreeMap::new();

    for record in records {
        let bucket = counts_by_date
            .entry(record.created_at.clone())
            .or_insert_with(|| StyleCounts::zeroed(vocabulary));
        let Some(style) = record.style.as_deref() else {
            continue;
        };
        match vocabulary.index_of(style) {
            Some(i) => bucket.counts[i] += 1,
            None => tracing::warn!(
                "Skipping record from {:?}: unknown style {:?}",
                record.created_at,
                style
            ),
        }
    }

    let mut per_year: BTreeMap<String, StyleCounts> = BTreeMap::new();
    for (date, counts) in &counts_by_date {
        per_year
            .entry(year_of(date).to_string())
            .or_insert_with(|| StyleCounts::zeroed(vocabulary))
            .add(counts);
    }

    let yearly = per_year
        .into_iter()
        .map(|(year, counts)| {
            let total = counts.total();
            let stats = match counts.dominant() {
                Some((label, count)) => YearlyStats {
                    total,
                    dominant_style: Some(label.clone()),
                    percentage: (count as f64 / total as f64 * 1000.0).round() / 10.0,
                },
                None => YearlyStats {
                    total,
                    dominant_style: None,
                    percentage: 0.0,
                },
            };
            (year, stats)
        })
        .collect();

    TrendReport {
        counts_by_date,
        yearly,
    }
}
