//! Benchmark suite for chunk payload decompression
//!
//! Measures the RLE and LZW decoders on flat and noisy inputs, and the full
//! path from archive lookup to a decoded screen.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dgds_benches::{generate_archive, generate_noise, generate_runs, sizes};
use dgds_types::file::codec::{Compression, compress, decompress};
use dgds_types::file::{ProfileTable, ResourceFile, ResourceLoader};

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
	vec![
		("tile_runs", generate_runs(sizes::TILE, 16, 1)),
		("plane_runs", generate_runs(sizes::PLANE, 64, 2)),
		("screen_runs", generate_runs(sizes::SCREEN, 64, 3)),
		("screen_noise", generate_noise(sizes::SCREEN, 4)),
	]
}

fn bench_method(c: &mut Criterion, method: Compression, group_name: &str) {
	let mut group = c.benchmark_group(group_name);
	for (name, raw) in inputs() {
		let packed = compress(method, &raw);
		group.throughput(Throughput::Bytes(raw.len() as u64));
		group.bench_with_input(BenchmarkId::new("decompress", name), &packed, |b, packed| {
			b.iter(|| {
				let result = decompress(method, black_box(packed), raw.len());
				black_box(result)
			});
		});
	}
	group.finish();
}

/// Benchmark RLE decompression
fn bench_rle(c: &mut Criterion) {
	bench_method(c, Compression::Rle, "rle");
}

/// Benchmark LZW decompression
fn bench_lzw(c: &mut Criterion) {
	bench_method(c, Compression::Lzw, "lzw");
}

/// Benchmark chunk parsing of a whole screen file
fn bench_screen_file(c: &mut Criterion) {
	let mut group = c.benchmark_group("screen");
	let profiles = ProfileTable::builtin();
	let data = dgds_benches::generate_screen_file(&generate_runs(sizes::SCREEN, 64, 5));

	group.throughput(Throughput::Bytes(sizes::SCREEN as u64));
	group.bench_function("parse", |b| {
		b.iter(|| {
			let file = ResourceFile::parse("BENCH.SCR", black_box(&data), &profiles, Default::default());
			black_box(file.and_then(|f| f.screen()))
		});
	});

	let loader = ResourceLoader::new(generate_archive(32, 6).build_archive());
	group.sample_size(50);
	group.bench_function("load_from_archive", |b| {
		b.iter(|| {
			let screen = loader.load_screen(black_box("SCREEN17.SCR"));
			black_box(screen)
		});
	});
	group.finish();
}

criterion_group!(benches, bench_rle, bench_lzw, bench_screen_file);

criterion_main!(benches);
