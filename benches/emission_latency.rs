// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Emission-scoring benchmark: plain nearest-neighbor loop vs. partial
//! distance elimination.
//!
//! Run with: `cargo bench --bench emission_latency`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sadkit::acoustic::gaussian::Gaussian;
use sadkit::acoustic::state::HmmState;
use sadkit::acoustic::DIM;

/// A 32-component mixture at the conventional dimensionality, with means
/// spread out so PDE has pruning opportunities.
fn make_state() -> HmmState {
    let components = (0..32)
        .map(|i| {
            let offset = (i as f32 - 16.0) * 0.5;
            let mean = (0..DIM).map(|d| offset + d as f32 * 0.01).collect();
            let variances = vec![1.0 + (i as f32) * 0.05; DIM];
            Gaussian::new(i, 1.0 / 32.0, mean, variances)
        })
        .collect();
    let mut state = HmmState::new(0, 0, 0, 0, DIM, components).unwrap();
    state.initialize().unwrap();
    state
}

fn bench_emission(c: &mut Criterion) {
    let state = make_state();
    let features: Vec<f32> = (0..DIM).map(|d| (d as f32 * 0.3).sin()).collect();

    let mut group = c.benchmark_group("emission");
    group.bench_function("nearest_neighbor", |b| {
        b.iter(|| state.nearest_neighbor_score(black_box(&features)))
    });
    group.bench_function("nearest_neighbor_pde", |b| {
        b.iter(|| state.nearest_neighbor_score_pde(black_box(&features)))
    });
    group.finish();
}

criterion_group!(benches, bench_emission);
criterion_main!(benches);
