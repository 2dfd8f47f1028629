//! Component benchmarks: forest training, batch scoring and whole-grid throughput.

#[path = "../../common/mod.rs"]
mod common;

use std::num::NonZeroUsize;

use common::criterion_config::default_criterion;

use isolators::testing::data::{clustered_with_outlier, random_feature_tensor};
use isolators::{EnsembleParams, ForestConfig, TileScoringGrid, TreeEnsemble};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn bench_ensemble_train(c: &mut Criterion) {
	let mut group = c.benchmark_group("component/ensemble/train");

	for n_frames in [64usize, 256, 1_024] {
		let x = clustered_with_outlier(n_frames, 8, 42);
		let params = EnsembleParams::default();

		group.throughput(Throughput::Elements(params.n_trees as u64));
		group.bench_with_input(BenchmarkId::new("frames", n_frames), &x, |b, x| {
			b.iter(|| {
				let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
				let ensemble = TreeEnsemble::train(black_box(x.view()), &params, &mut rng);
				black_box(ensemble)
			});
		});
	}

	group.finish();
}

fn bench_ensemble_score_all(c: &mut Criterion) {
	let mut group = c.benchmark_group("component/ensemble/score_all");

	let x = clustered_with_outlier(1_024, 8, 42);
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
	let ensemble = TreeEnsemble::train(x.view(), &EnsembleParams::default(), &mut rng)
		.expect("training failed");

	for height_limit in [8usize, 20] {
		group.throughput(Throughput::Elements(x.nrows() as u64));
		group.bench_with_input(BenchmarkId::new("height_limit", height_limit), &x, |b, x| {
			b.iter(|| {
				let scores = ensemble.score_all(black_box(x.view()), height_limit);
				black_box(scores)
			});
		});
	}

	group.finish();
}

fn bench_grid_threads(c: &mut Criterion) {
	let mut group = c.benchmark_group("component/grid/threads");

	let features = random_feature_tensor(4, 4, 128, 6, 42);
	let n_tiles = 16u64;

	for n_threads in [1usize, 2, 4, 8] {
		let config = ForestConfig::builder()
			.n_trees(50)
			.n_threads(NonZeroUsize::new(n_threads).expect("nonzero"))
			.build()
			.expect("valid config");
		let grid = TileScoringGrid::new(config).expect("valid config");

		group.throughput(Throughput::Elements(n_tiles));
		group.bench_with_input(BenchmarkId::new("n_threads", n_threads), &features, |b, f| {
			b.iter(|| {
				let scores = grid.score(black_box(f.view()));
				black_box(scores)
			});
		});
	}

	group.finish();
}

criterion_group! {
	name = benches;
	config = default_criterion();
	targets = bench_ensemble_train, bench_ensemble_score_all, bench_grid_threads
}
criterion_main!(benches);
