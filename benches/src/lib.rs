//! Benchmark helper utilities for dgds-rs
//!
//! Game archives are not redistributable, so every workload here is synthetic.
//! Generators are seeded so runs are comparable.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use dgds_types::file::chunk::ChunkBuilder;
use dgds_types::file::codec::Compression;
use dgds_types::file::{ArchiveBuilder, ChunkTag};

/// Generates image-like pixels: runs of one colour with random lengths.
///
/// Real screens are dominated by flat areas, which is what both codecs are
/// tuned for.
pub fn generate_runs(len: usize, max_run: usize, seed: u64) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(seed);
	let mut data = Vec::with_capacity(len);
	while data.len() < len {
		let run = rng.random_range(1..=max_run).min(len - data.len());
		let color: u8 = rng.random();
		data.extend(std::iter::repeat_n(color, run));
	}
	data
}

/// Generates uniformly random bytes, the worst case for both codecs.
pub fn generate_noise(len: usize, seed: u64) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(seed);
	let mut data = vec![0u8; len];
	rng.fill(data.as_mut_slice());
	data
}

/// Builds an `SCR` resource holding `pixels` as an LZW-packed `MA8` chunk.
pub fn generate_screen_file(pixels: &[u8]) -> Vec<u8> {
	ChunkBuilder::new().packed_leaf(ChunkTag::MA8, Compression::Lzw, pixels).build()
}

/// Builds an archive with `count` screen files named `SCREEN{n}.SCR`.
pub fn generate_archive(count: usize, seed: u64) -> ArchiveBuilder {
	(0..count).fold(ArchiveBuilder::new([0x12, 0x34, 0x56, 0x78]), |builder, n| {
		let pixels = generate_runs(sizes::SCREEN, 64, seed + n as u64);
		builder.file(&format!("SCREEN{n}.SCR"), generate_screen_file(&pixels))
	})
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// A 32x32 tile
	pub const TILE: usize = 32 * 32;
	/// One 4bpp plane of a full screen
	pub const PLANE: usize = 320 * 200 / 2;
	/// A full 8bpp screen
	pub const SCREEN: usize = 320 * 200;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generators_are_seeded() {
		assert_eq!(generate_runs(1000, 16, 7), generate_runs(1000, 16, 7));
		assert_eq!(generate_runs(1000, 16, 7).len(), 1000);
		assert_eq!(generate_noise(sizes::TILE, 1).len(), sizes::TILE);
	}

	#[test]
	fn test_generate_archive() {
		let archive = generate_archive(3, 0).build_archive();
		assert!(archive.read_file("SCREEN2.SCR").unwrap().is_some());
	}
}
