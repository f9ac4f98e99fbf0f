//! Benchmarks for leapfrog time stepping and diagnostics.
//!
//! Run with: `cargo bench --bench time_stepping_bench`
//!
//! Add `--features parallel` to benchmark the row-parallel stencil update.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use npzb_rs::config::ModelConfig;
use npzb_rs::forcing::{ForcingProvider, InMemoryForcing};
use npzb_rs::mesh::SeaMask;
use npzb_rs::simulation::Simulation;
use npzb_rs::solver::{DiagnosticsTracker, NPZBDiagnostics, NPZBState, Tracer};
use npzb_rs::time::LeapfrogIntegrator;
use npzb_rs::types::GridShape;

/// Closed basin with a steady, slightly oblique current.
fn setup_forcing(ny: usize, nx: usize, times: Vec<f64>) -> InMemoryForcing {
    let mask = SeaMask::closed_basin(GridShape::new(ny, nx));
    InMemoryForcing::uniform(mask, 250.0, 250.0, times, 0.1, 0.03).unwrap()
}

fn initial_state(forcing: &InMemoryForcing, config: &ModelConfig) -> NPZBState {
    let mut state = NPZBState::new(forcing.mask().clone());
    for tracer in Tracer::ALL {
        state.initialize(tracer, &config.initial.gradient_spec(tracer, state.shape()));
    }
    state
}

/// Benchmark a single leapfrog step.
fn bench_leapfrog_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("leapfrog_step");

    for (ny, nx) in [(32, 64), (64, 128), (128, 256)] {
        let n_cells = ny * nx;
        let forcing = setup_forcing(ny, nx, vec![0.0, 86_400.0]);
        let config = ModelConfig::default();
        let state = initial_state(&forcing, &config);

        group.bench_with_input(
            BenchmarkId::new("step", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter_batched_ref(
                    || LeapfrogIntegrator::new(&forcing, state.clone(), config.clone()).unwrap(),
                    |integrator| black_box(integrator.step()),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark a short driven run including sampling.
fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(20);

    for hours in [1, 6, 24] {
        let times: Vec<f64> = (0..=hours).map(|h| h as f64 * 3600.0).collect();
        let forcing = setup_forcing(40, 80, times);

        group.bench_with_input(
            BenchmarkId::new("hours", hours.to_string()),
            &hours,
            |b, _| {
                b.iter(|| {
                    let integrator =
                        LeapfrogIntegrator::from_config(&forcing, ModelConfig::default()).unwrap();
                    Simulation::new(integrator)
                        .with_output_interval(3600.0)
                        .quiet()
                        .with_diagnostics(false)
                        .run()
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark diagnostics computation.
fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");

    for (ny, nx) in [(32, 64), (128, 256)] {
        let n_cells = ny * nx;
        let forcing = setup_forcing(ny, nx, vec![0.0, 3600.0]);
        let state = initial_state(&forcing, &ModelConfig::default());
        let (idx, idy) = forcing.inverse_spacing();

        group.bench_with_input(
            BenchmarkId::new("compute", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| {
                    NPZBDiagnostics::compute(
                        black_box(&state),
                        black_box(state.levels().cur()),
                        black_box(idx),
                        black_box(idy),
                    )
                });
            },
        );
    }

    group.finish();
}

/// Benchmark diagnostics tracker update.
fn bench_diagnostics_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics_tracker");

    let forcing = setup_forcing(64, 128, vec![0.0, 3600.0]);
    let state = initial_state(&forcing, &ModelConfig::default());
    let (idx, idy) = forcing.inverse_spacing();
    let diag = NPZBDiagnostics::compute(&state, state.levels().cur(), idx, idy);

    group.bench_function("update", |b| {
        let mut tracker = DiagnosticsTracker::new(0.0, diag.clone());
        let mut t = 0.0;
        b.iter(|| {
            t += 600.0;
            tracker.update(black_box(t), black_box(diag.clone()));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_leapfrog_step,
    bench_simulation,
    bench_diagnostics,
    bench_diagnostics_tracker
);
criterion_main!(benches);
