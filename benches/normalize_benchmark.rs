//! Benchmarks for Markdown normalization.
//!
//! Run with: cargo bench
//!
//! These benchmarks exercise the normalization pass on synthetic
//! documents of varying sizes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docmd::normalize::MarkdownNormalizer;

/// Builds a synthetic Markdown document with the rough shape of
/// converter output: headings, paragraphs, lists and tables, with the
/// spacing problems the normalizer fixes.
fn create_test_document(sections: usize) -> String {
    let mut doc = String::new();
    for i in 0..sections {
        doc.push_str(&format!("## Section {}\n", i + 1));
        doc.push_str("A paragraph of body text that follows the heading.\n");
        doc.push_str("- first item\n- second item\n");
        doc.push_str("Intro line\n|Col A|Col B|\n|---|---|\n|1|2|\nTrailing line\n\n\n\n");
    }
    doc
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = MarkdownNormalizer::new();

    let mut group = c.benchmark_group("normalize");
    for sections in [10, 100, 1000] {
        let doc = create_test_document(sections);
        group.bench_function(format!("sections_{}", sections), |b| {
            b.iter(|| normalizer.normalize(black_box(&doc)))
        });
    }
    group.finish();
}

fn bench_normalize_clean_input(c: &mut Criterion) {
    let normalizer = MarkdownNormalizer::new();
    // Already-normalized input measures the steady-state cost.
    let doc = normalizer.normalize(&create_test_document(100));

    c.bench_function("normalize_idempotent_pass", |b| {
        b.iter(|| normalizer.normalize(black_box(&doc)))
    });
}

criterion_group!(benches, bench_normalize, bench_normalize_clean_input);
criterion_main!(benches);
