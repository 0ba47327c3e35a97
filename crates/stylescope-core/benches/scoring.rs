//! Benchmarks for similarity scoring and the mock classifier.
//!
//! Run with: cargo bench -p stylescope-core

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stylescope_core::classify::{Classifier, LabelBank, LabelVocabulary, MockEngine};
use stylescope_core::math::{l2_normalize, softmax};
use stylescope_core::SimilarityScorer;

const DIM: usize = 512;

fn random_unit(rng: &mut StdRng) -> Vec<f32> {
    let raw: Vec<f32> = (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
    l2_normalize(&raw)
}

fn vocabulary(n: usize) -> LabelVocabulary {
    LabelVocabulary::new((0..n).map(|i| format!("style {i}"))).unwrap()
}

fn benchmark_softmax(c: &mut Criterion) {
    let logits: Vec<f32> = (0..1000).map(|i| (i % 37) as f32 * 0.7).collect();

    c.bench_function("softmax_1000", |b| {
        b.iter(|| softmax(black_box(&logits)))
    });
}

fn benchmark_score(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let scorer = SimilarityScorer::new(100.0);

    for n in [8, 1000] {
        let vocab = vocabulary(n);
        let bank =
            LabelBank::from_embeddings((0..n).map(|_| random_unit(&mut rng)).collect()).unwrap();
        let image = random_unit(&mut rng);

        c.bench_function(&format!("score_{n}_labels"), |b| {
            b.iter(|| scorer.score(black_box(&image), &bank, &vocab).unwrap())
        });
    }
}

fn benchmark_mock(c: &mut Criterion) {
    let vocab = vocabulary(8);
    let deterministic = MockEngine::deterministic(0.85, 1);
    let randomized = MockEngine::randomized(0.85, StdRng::seed_from_u64(2));

    c.bench_function("mock_deterministic", |b| {
        b.iter(|| deterministic.distribution(Path::new("x.jpg"), &vocab).unwrap())
    });
    c.bench_function("mock_randomized", |b| {
        b.iter(|| randomized.distribution(Path::new("x.jpg"), &vocab).unwrap())
    });
}

criterion_group!(benches, benchmark_softmax, benchmark_score, benchmark_mock);
criterion_main!(benches);
