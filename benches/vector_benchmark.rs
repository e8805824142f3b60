//! Benchmarks for the merge-walk vector algebra across load factors

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rlearn::vector::{Distance, EuclideanDistance, NumericVector};

fn sparse_vector(len: usize, stride: usize, seed: f64) -> NumericVector {
    let mut vector = NumericVector::new(len);
    let mut position = 0;
    while position < len {
        vector.insert(seed + position as f64 * 0.001, position);
        position += stride;
    }
    vector
}

fn dense_vector(len: usize, seed: f64) -> NumericVector {
    let values: Vec<f64> = (0..len).map(|i| seed + i as f64 * 0.001).collect();
    NumericVector::from_dense(&values)
}

fn bench_dot_product(c: &mut Criterion) {
    let sparse_a = sparse_vector(10_000, 50, 1.0);
    let sparse_b = sparse_vector(10_000, 70, 2.0);
    let dense_a = dense_vector(10_000, 1.0);
    let dense_b = dense_vector(10_000, 2.0);

    c.bench_function("dot sparse x sparse", |b| {
        b.iter(|| black_box(&sparse_a).dot(black_box(&sparse_b)).unwrap())
    });
    c.bench_function("dot dense x dense", |b| {
        b.iter(|| black_box(&dense_a).dot(black_box(&dense_b)).unwrap())
    });
    c.bench_function("dot sparse x dense (probe path)", |b| {
        b.iter(|| black_box(&sparse_a).dot(black_box(&dense_b)).unwrap())
    });
}

fn bench_euclidean_distance(c: &mut Criterion) {
    let sparse_a = sparse_vector(10_000, 50, 1.0);
    let sparse_b = sparse_vector(10_000, 70, 2.0);
    let dense_a = dense_vector(10_000, 1.0);
    let dense_b = dense_vector(10_000, 2.0);

    c.bench_function("euclidean sparse x sparse", |b| {
        b.iter(|| EuclideanDistance.compute(black_box(&sparse_a), black_box(&sparse_b)))
    });
    c.bench_function("euclidean dense x dense", |b| {
        b.iter(|| EuclideanDistance.compute(black_box(&dense_a), black_box(&dense_b)))
    });
}

fn bench_gradient_update(c: &mut Criterion) {
    let gradient = sparse_vector(10_000, 100, 0.5);

    c.bench_function("sparse gradient update", |b| {
        b.iter(|| {
            let mut weights = dense_vector(10_000, 1.0);
            weights.update(1.0, 0.01, black_box(&gradient)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_dot_product,
    bench_euclidean_distance,
    bench_gradient_update
);
criterion_main!(benches);
