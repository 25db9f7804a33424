use bucket_td::bucket_elimination::{BucketElimination, BucketEliminationDecomposer};
use bucket_td::context::Context;
use bucket_td::graph::Hypergraph;
use bucket_td::heuristic_elimination_order::{compute_order, OrderingAlgorithmType};
use bucket_td::manipulation::{ManipulationOperation, WidthReduction};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};

fn random_graph(n: usize, p: f64, seed: u64) -> Hypergraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Hypergraph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen_bool(p) {
                graph.add_edge(u, v);
            }
        }
    }
    graph
}

fn orderings(c: &mut Criterion) {
    let graph = random_graph(300, 0.03, 1);
    let ctx = Context::new();

    c.bench_function("min_fill_order", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| compute_order(black_box(&graph), &mut rng, &ctx))
    });

    c.bench_function("min_degree_order", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| OrderingAlgorithmType::MinDegree.compute(black_box(&graph), &mut rng, &ctx))
    });
}

fn decompositions(c: &mut Criterion) {
    let graph = random_graph(300, 0.03, 1);
    let ctx = Context::new();
    let mut rng = StdRng::seed_from_u64(0);
    let ordering = compute_order(&graph, &mut rng, &ctx).unwrap();

    c.bench_function("bucket_elimination", |b| {
        let engine = BucketElimination::default();
        b.iter(|| engine.compute_decomposition(black_box(&graph), &ordering, &mut rng, &ctx))
    });

    c.bench_function("bucket_elimination_width_reduction", |b| {
        let decomposer = BucketEliminationDecomposer::new()
            .seed(Some(0))
            .with_operation(ManipulationOperation::Structural(Box::new(
                WidthReduction::default(),
            )));
        b.iter(|| decomposer.compute(black_box(&graph), &ctx))
    });
}

criterion_group!(benches, orderings, decompositions);
criterion_main!(benches);
