// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use siting_bnb::{
    bnb::BnbSolver, monitor::no_op::NoOperationMonitor, parallel::ParallelBnbSolver,
    warm_start::WarmStartHeuristic,
};
use siting_lp::{bounds::ActivationBounds, relaxation::RelaxationSolver};
use siting_model::{
    entity::{DemandPoint, Facility},
    model::Model,
};
use std::hint::black_box;

/// Random instance with enough total capacity for about two thirds of the
/// facilities to be needed.
fn random_instance(seed: u64, num_facilities: usize, num_demand_points: usize) -> Model {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let demand_points: Vec<DemandPoint> = (0..num_demand_points)
        .map(|d| DemandPoint::new(format!("D{}", d), rng.random_range(5.0..50.0)))
        .collect();
    let total: f64 = demand_points.iter().map(DemandPoint::demand).sum();
    let mean_capacity = 1.5 * total / num_facilities as f64;
    let facilities = (0..num_facilities)
        .map(|f| {
            let capacity = mean_capacity * rng.random_range(0.5..1.5);
            Facility::new(format!("F{}", f), capacity, rng.random_range(100.0..1000.0))
        })
        .collect();
    let costs = (0..num_demand_points)
        .map(|_| {
            (0..num_facilities)
                .map(|_| rng.random_range(1.0..25.0))
                .collect()
        })
        .collect();
    Model::new(facilities, demand_points, costs).expect("valid benchmark instance")
}

const SIZES: [(usize, usize); 3] = [(8, 20), (12, 30), (16, 40)];

fn bench_root_relaxation(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_relaxation");
    let solver = RelaxationSolver::new();
    for (nf, nd) in SIZES {
        let model = random_instance(7, nf, nd);
        let bounds = ActivationBounds::root(nf);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", nf, nd)),
            &model,
            |b, model| b.iter(|| black_box(solver.solve(black_box(model), &bounds))),
        );
    }
    group.finish();
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_sequential");
    group.sample_size(10);
    for (nf, nd) in SIZES {
        let model = random_instance(11, nf, nd);
        let warm = WarmStartHeuristic::default().run(&model);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", nf, nd)),
            &model,
            |b, model| {
                b.iter(|| {
                    let solver = BnbSolver::new();
                    let outcome = match &warm {
                        Some(w) => solver.solve_with_warm_start(model, w.clone(), NoOperationMonitor),
                        None => solver.solve(model, NoOperationMonitor),
                    };
                    black_box(outcome)
                })
            },
        );
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_parallel");
    group.sample_size(10);
    let (nf, nd) = SIZES[SIZES.len() - 1];
    let model = random_instance(11, nf, nd);
    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::new("threads", threads), &model, |b, model| {
            b.iter(|| {
                black_box(ParallelBnbSolver::new(threads).solve(model, |_| NoOperationMonitor))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_root_relaxation,
    bench_sequential,
    bench_parallel
);
criterion_main!(benches);
