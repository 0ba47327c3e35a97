//! End-to-end classification through the engine with an in-memory provider.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stylescope_core::config::ScoringConfig;
use stylescope_core::{
    classify_with_timeout, ClassificationEngine, ClassificationResult, Classifier, ClassifyError,
    ClassifyMode, Embedding, EmbeddingProvider, Label, LabelVocabulary, MockEngine,
    ProbabilityDistribution,
};

/// Looks embeddings up by label text and by image file stem.
struct TableProvider {
    images: HashMap<String, Embedding>,
    labels: HashMap<String, Embedding>,
    text_calls: AtomicUsize,
}

impl TableProvider {
    fn new(images: &[(&str, Embedding)], labels: &[(&str, Embedding)]) -> Self {
        let own = |pairs: &[(&str, Embedding)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect()
        };
        Self {
            images: own(images),
            labels: own(labels),
            text_calls: AtomicUsize::new(0),
        }
    }
}

impl EmbeddingProvider for TableProvider {
    fn embed_image(&self, path: &Path) -> Result<Embedding, ClassifyError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        self.images
            .get(stem)
            .cloned()
            .ok_or_else(|| ClassifyError::ImageLoad {
                path: path.to_path_buf(),
                message: "no such image".into(),
            })
    }

    fn embed_text(&self, label: &Label) -> Result<Embedding, ClassifyError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.labels
            .get(label.as_str())
            .cloned()
            .ok_or_else(|| ClassifyError::ModelUnavailable {
                message: format!("no embedding for {label}"),
            })
    }
}

fn styles() -> LabelVocabulary {
    LabelVocabulary::new(["chic style", "goth style", "kawaii style", "vintage style"]).unwrap()
}

fn style_provider() -> TableProvider {
    TableProvider::new(
        &[
            ("all_black", vec![0.1, 0.99, 0.0, 0.0]),
            ("pastel", vec![0.0, 0.0, 1.0, 0.0]),
            ("wide", vec![1.0; 8]),
        ],
        &[
            ("chic style", vec![1.0, 0.0, 0.0, 0.0]),
            ("goth style", vec![0.0, 1.0, 0.0, 0.0]),
            ("kawaii style", vec![0.0, 0.0, 1.0, 0.0]),
            ("vintage style", vec![0.0, 0.0, 0.0, 1.0]),
            ("odd style", vec![1.0, 0.0]),
        ],
    )
}

fn engine() -> ClassificationEngine<TableProvider> {
    ClassificationEngine::new(style_provider(), &ScoringConfig::default())
}

fn assert_valid(d: &ProbabilityDistribution, n: usize) {
    assert_eq!(d.len(), n);
    assert!(d.probabilities().iter().all(|p| (0.0..=1.0).contains(p)));
    assert!((d.sum() - 1.0).abs() < 1e-6);
}

#[test]
fn engine_picks_closest_style() {
    let engine = engine();
    let vocab = styles();

    let result = engine
        .classify(Path::new("all_black.jpg"), &vocab, ClassifyMode::DominantLabel)
        .unwrap();
    assert_eq!(result, ClassificationResult::Dominant("goth style".into()));

    let result = engine
        .classify(Path::new("pastel.jpg"), &vocab, ClassifyMode::FullDistribution)
        .unwrap();
    let d = result.as_distribution().unwrap();
    assert_valid(d, 4);
    assert_eq!(d.dominant().unwrap().as_str(), "kawaii style");
}

#[test]
fn engine_is_idempotent() {
    let engine = engine();
    let vocab = styles();
    let first = engine.distribution(Path::new("all_black.jpg"), &vocab).unwrap();
    let second = engine.distribution(Path::new("all_black.jpg"), &vocab).unwrap();
    assert_eq!(first, second);
}

#[test]
fn label_embeddings_are_cached_per_vocabulary() {
    let engine = engine();
    let vocab = styles();

    engine.distribution(Path::new("all_black.jpg"), &vocab).unwrap();
    engine.distribution(Path::new("pastel.jpg"), &vocab).unwrap();
    assert_eq!(engine.provider().text_calls.load(Ordering::SeqCst), 4);

    let smaller = LabelVocabulary::new(["goth style", "chic style"]).unwrap();
    engine.distribution(Path::new("pastel.jpg"), &smaller).unwrap();
    assert_eq!(engine.provider().text_calls.load(Ordering::SeqCst), 6);
}

#[test]
fn label_cache_is_bounded() {
    let engine = ClassificationEngine::with_cache_capacity(
        style_provider(),
        &ScoringConfig::default(),
        2,
    );
    let calls = || engine.provider().text_calls.load(Ordering::SeqCst);
    let a = LabelVocabulary::new(["chic style"]).unwrap();
    let b = LabelVocabulary::new(["goth style"]).unwrap();
    let c = LabelVocabulary::new(["kawaii style"]).unwrap();

    for vocab in [&a, &b, &c] {
        engine.distribution(Path::new("pastel.jpg"), vocab).unwrap();
    }
    assert_eq!(engine.cached_vocabularies(), 2);
    assert_eq!(calls(), 3);

    // `c` is still cached; `a` was evicted and is encoded again.
    engine.distribution(Path::new("pastel.jpg"), &c).unwrap();
    assert_eq!(calls(), 3);
    engine.distribution(Path::new("pastel.jpg"), &a).unwrap();
    assert_eq!(calls(), 4);
    assert_eq!(engine.cached_vocabularies(), 2);
}

#[test]
fn single_label_vocabulary_is_certain() {
    let vocab = LabelVocabulary::new(["goth style"]).unwrap();
    let d = engine().distribution(Path::new("pastel.jpg"), &vocab).unwrap();
    assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"goth style":1.0}"#);
}

#[test]
fn mismatched_dimensions_produce_no_output() {
    let err = engine()
        .distribution(Path::new("wide.jpg"), &styles())
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::DimensionMismatch {
            expected: 4,
            actual: 8,
            ..
        }
    ));

    let ragged = LabelVocabulary::new(["chic style", "odd style"]).unwrap();
    let err = engine()
        .distribution(Path::new("pastel.jpg"), &ragged)
        .unwrap_err();
    assert!(matches!(err, ClassifyError::DimensionMismatch { .. }));
}

#[test]
fn provider_errors_propagate_unchanged() {
    let err = engine()
        .distribution(Path::new("missing.jpg"), &styles())
        .unwrap_err();
    assert!(matches!(err, ClassifyError::ImageLoad { .. }));

    let unknown = LabelVocabulary::new(["punk style"]).unwrap();
    let err = engine()
        .distribution(Path::new("pastel.jpg"), &unknown)
        .unwrap_err();
    assert!(matches!(err, ClassifyError::ModelUnavailable { .. }));
}

#[test]
fn mock_and_engine_are_interchangeable() {
    let classifiers: Vec<Box<dyn Classifier>> = vec![
        Box::new(engine()),
        Box::new(MockEngine::deterministic(0.85, 1)),
    ];
    for classifier in classifiers {
        let d = classifier
            .distribution(Path::new("all_black.jpg"), &styles())
            .unwrap();
        assert_valid(&d, 4);
        assert_eq!(d.dominant().unwrap().as_str(), "goth style");
    }
}

struct SlowClassifier;

impl Classifier for SlowClassifier {
    fn distribution(
        &self,
        image: &Path,
        vocabulary: &LabelVocabulary,
    ) -> Result<ProbabilityDistribution, ClassifyError> {
        std::thread::sleep(Duration::from_millis(500));
        MockEngine::deterministic(0.85, 0).distribution(image, vocabulary)
    }
}

#[tokio::test]
async fn classify_with_timeout_returns_result() {
    let result = classify_with_timeout(
        Arc::new(MockEngine::deterministic(0.85, 1)),
        PathBuf::from("look.jpg"),
        Arc::new(styles()),
        ClassifyMode::DominantLabel,
        Duration::from_secs(5),
    )
    .await
    .unwrap();
    assert_eq!(result.as_label().unwrap().as_str(), "goth style");
}

#[tokio::test]
async fn classify_with_timeout_expires() {
    let err = classify_with_timeout(
        Arc::new(SlowClassifier),
        PathBuf::from("look.jpg"),
        Arc::new(styles()),
        ClassifyMode::FullDistribution,
        Duration::from_millis(20),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ClassifyError::Timeout { timeout_ms: 20, .. }));
}
