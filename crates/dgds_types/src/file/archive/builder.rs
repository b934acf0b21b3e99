//! Archive construction.

use std::fs;
use std::path::{Path, PathBuf};

use super::hash::{Salt, dgds_hash};
use super::index::{IndexEntry, IndexFile, VolumeIndex};
use super::volume::{MemorySource, RecordHeader};
use super::Archive;
use crate::file::DgdsError;

/// Name used for the first volume when none was started explicitly.
const DEFAULT_VOLUME: &str = "RESOURCE.001";

#[derive(Debug, Clone)]
struct PendingFile {
	name: String,
	data: Option<Vec<u8>>,
	hash: Option<u32>,
}

#[derive(Debug, Clone)]
struct PendingVolume {
	name: String,
	files: Vec<PendingFile>,
}

/// Builds an index and its volumes.
///
/// # Examples
///
/// ```
/// use dgds_types::file::archive::ArchiveBuilder;
///
/// let archive = ArchiveBuilder::new([0, 1, 2, 3])
/// 	.volume("RESOURCE.001")
/// 	.file("INTRO.TTM", b"...".to_vec())
/// 	.build_archive();
/// assert!(archive.resolve("intro.ttm").unwrap().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
	salt: Salt,
	volumes: Vec<PendingVolume>,
}

impl ArchiveBuilder {
	/// Creates a builder with the given hash salt.
	pub fn new(salt: Salt) -> Self {
		Self {
			salt,
			volumes: Vec::new(),
		}
	}

	/// Starts a new volume; following files are stored in it.
	pub fn volume(mut self, name: &str) -> Self {
		self.volumes.push(PendingVolume {
			name: name.to_string(),
			files: Vec::new(),
		});
		self
	}

	fn push(mut self, file: PendingFile) -> Self {
		if self.volumes.is_empty() {
			self = self.volume(DEFAULT_VOLUME);
		}
		if let Some(volume) = self.volumes.last_mut() {
			volume.files.push(file);
		}
		self
	}

	/// Adds a file to the current volume.
	pub fn file(self, name: &str, data: Vec<u8>) -> Self {
		self.push(PendingFile {
			name: name.to_string(),
			data: Some(data),
			hash: None,
		})
	}

	/// Adds a file whose index slot stores `hash` instead of the derived hash.
	pub fn file_with_hash(self, name: &str, data: Vec<u8>, hash: u32) -> Self {
		self.push(PendingFile {
			name: name.to_string(),
			data: Some(data),
			hash: Some(hash),
		})
	}

	/// Adds a tombstone record.
	pub fn tombstone(self, name: &str) -> Self {
		self.push(PendingFile {
			name: name.to_string(),
			data: None,
			hash: None,
		})
	}

	/// Produces the index and the bytes of each volume.
	pub fn build(self) -> (IndexFile, Vec<(String, Vec<u8>)>) {
		let salt = self.salt;
		let mut index = IndexFile {
			salt,
			volumes: Vec::with_capacity(self.volumes.len()),
		};
		let mut volumes = Vec::with_capacity(self.volumes.len());

		for volume in self.volumes {
			let mut bytes = Vec::new();
			let mut entries = Vec::with_capacity(volume.files.len());
			for file in volume.files {
				entries.push(IndexEntry {
					hash: file.hash.unwrap_or_else(|| dgds_hash(&file.name, &salt)),
					offset: bytes.len() as u32,
				});
				let header = RecordHeader {
					length: file.data.as_ref().map(|d| d.len() as u32),
					name: file.name,
				};
				bytes.extend_from_slice(&header.to_bytes());
				if let Some(data) = file.data {
					bytes.extend_from_slice(&data);
				}
			}
			index.volumes.push(VolumeIndex {
				name: volume.name.clone(),
				entries,
			});
			volumes.push((volume.name, bytes));
		}

		(index, volumes)
	}

	/// Produces the index and an in-memory volume source.
	pub fn build_source(self) -> (IndexFile, MemorySource) {
		let (index, volumes) = self.build();
		let mut source = MemorySource::new();
		for (name, bytes) in volumes {
			source.insert(&name, bytes);
		}
		(index, source)
	}

	/// Produces an in-memory [`Archive`].
	pub fn build_archive(self) -> Archive {
		let (index, source) = self.build_source();
		Archive::new(index, source)
	}

	/// Writes the index as `index_name` and every volume into `dir`.
	///
	/// Returns the path of the index file.
	pub fn write_to(self, dir: impl AsRef<Path>, index_name: &str) -> Result<PathBuf, DgdsError> {
		let dir = dir.as_ref();
		let (index, volumes) = self.build();
		for (name, bytes) in volumes {
			fs::write(dir.join(name), bytes)?;
		}
		let index_path = dir.join(index_name);
		fs::write(&index_path, index.to_bytes())?;
		Ok(index_path)
	}
}
