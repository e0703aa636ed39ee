//! Criterion benchmarks for fragmentation analysis
//!
//! Tracks the cost of:
//! - BFS traversal and all-pairs distances
//! - Single-removal measures (one reduction per node)
//! - Greedy selection (measures recomputed every step)
//! - Exhaustive pair search of the flow selector

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use keynode_graph::{
    breadth_first_search, distance_matrix, f_measure, fd_measure, find_key_nodes,
    select_flow_sources, CsrGraph, FlowConfig, GreedyConfig, Measure, NodeId,
};
use std::hint::black_box;

/// Generate a connected sparse graph: a ring plus pseudo-random chords
fn generate_ring_with_chords(num_nodes: usize, chords_per_node: usize) -> CsrGraph {
    let mut edges = Vec::new();
    let mut rng_state = 12345_u64; // Simple LCG for reproducibility

    for node in 0..num_nodes {
        edges.push((NodeId(node as u32), NodeId(((node + 1) % num_nodes) as u32)));
        for _ in 0..chords_per_node {
            rng_state = rng_state.wrapping_mul(1103515245).wrapping_add(12345);
            let target = (rng_state % num_nodes as u64) as u32;

            if target != node as u32 {
                edges.push((NodeId(node as u32), NodeId(target)));
            }
        }
    }

    CsrGraph::from_edge_list(num_nodes, &edges).unwrap()
}

/// Benchmark: BFS traversal and the all-pairs distance matrix
fn bench_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("distances");

    for size in [100, 500, 1000].iter() {
        let graph = generate_ring_with_chords(*size, 2);

        group.bench_with_input(BenchmarkId::new("bfs", size), &graph, |b, graph| {
            b.iter(|| {
                let layers = breadth_first_search(black_box(graph), NodeId(0)).unwrap();
                black_box(layers);
            });
        });

        group.bench_with_input(BenchmarkId::new("distance_matrix", size), &graph, |b, graph| {
            b.iter(|| black_box(distance_matrix(black_box(graph))));
        });
    }

    group.finish();
}

/// Benchmark: single-removal measures
fn bench_measures(c: &mut Criterion) {
    let mut group = c.benchmark_group("measures");

    for size in [25, 50, 100].iter() {
        let graph = generate_ring_with_chords(*size, 1);

        group.bench_with_input(BenchmarkId::new("f_measure", size), &graph, |b, graph| {
            b.iter(|| black_box(f_measure(black_box(graph))));
        });

        group.bench_with_input(BenchmarkId::new("fd_measure", size), &graph, |b, graph| {
            b.iter(|| black_box(fd_measure(black_box(graph))));
        });
    }

    group.finish();
}

/// Benchmark: greedy key-node selection
fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy");
    group.sample_size(20);

    for size in [20, 40].iter() {
        let graph = generate_ring_with_chords(*size, 1);

        for measure in [Measure::FMeasure, Measure::Combined] {
            let config = GreedyConfig::new(measure);
            group.bench_with_input(
                BenchmarkId::new(format!("{measure:?}"), size),
                &graph,
                |b, graph| {
                    b.iter(|| black_box(find_key_nodes(black_box(graph), &config).unwrap()));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark: exhaustive flow search, pairs only
fn bench_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow");
    let config = FlowConfig::default().with_max_set_size(2);

    for size in [20, 40, 80].iter() {
        let distances = distance_matrix(&generate_ring_with_chords(*size, 1));

        group.bench_with_input(BenchmarkId::new("pairs", size), &distances, |b, distances| {
            b.iter(|| black_box(select_flow_sources(black_box(distances), &config).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_distances, bench_measures, bench_greedy, bench_flow);
criterion_main!(benches);
