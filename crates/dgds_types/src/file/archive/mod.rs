//! Multi-volume archives.
//!
//! An archive is an index file plus one or more volume files. The index lists, per
//! volume, the hash of each stored name and the offset of its record; each record in
//! the volume repeats the name in front of the payload. Names are authoritative: a
//! hash that disagrees with the stored name is reported but not trusted.

mod builder;
pub mod hash;
pub mod index;
pub mod volume;

use std::io;
use std::path::Path;

use log::{debug, warn};

pub use builder::ArchiveBuilder;
pub use hash::{Salt, dgds_hash};
pub use index::{IndexEntry, IndexFile, VolumeIndex};
pub use volume::{DirectorySource, MemorySource, RecordHeader, VolumeSource};

use crate::file::{DgdsError, FileType};
use volume::RECORD_HEADER_SIZE;

/// A resolved file inside a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
	/// Stored file name
	pub name: String,
	/// Hash derived from the name
	pub hash: u32,
	/// Hash stored in the index
	pub stored_hash: u32,
	/// Position of the volume in the index
	pub volume: usize,
	/// Offset of the payload inside the volume
	pub offset: u64,
	/// Payload length
	pub length: u32,
}

impl ArchiveEntry {
	/// Whether the stored and derived hashes agree.
	pub fn hash_matches(&self) -> bool {
		self.hash == self.stored_hash
	}
}

/// An index plus access to its volumes.
#[derive(Debug)]
pub struct Archive {
	index: IndexFile,
	source: Box<dyn VolumeSource>,
}

impl Archive {
	/// Opens an index file and reads volumes from the same directory.
	pub fn open(index_path: impl AsRef<Path>) -> Result<Self, DgdsError> {
		let index_path = index_path.as_ref();
		let index = IndexFile::open(index_path)?;
		let root = index_path.parent().unwrap_or_else(|| Path::new("."));
		debug!("{}: {index}", index_path.display());
		Ok(Self::new(index, DirectorySource::new(root)))
	}

	/// Combines a parsed index with a volume source.
	pub fn new(index: IndexFile, source: impl VolumeSource + 'static) -> Self {
		Self {
			index,
			source: Box::new(source),
		}
	}

	/// The parsed index.
	pub fn index(&self) -> &IndexFile {
		&self.index
	}

	/// Reads the record header a slot points at, or `None` if the volume is missing.
	fn read_record(&self, volume: &VolumeIndex, slot: &IndexEntry) -> Result<Option<RecordHeader>, DgdsError> {
		let mut buf = [0u8; RECORD_HEADER_SIZE];
		match self.source.read_at(&volume.name, u64::from(slot.offset), &mut buf) {
			Ok(()) => RecordHeader::from_bytes(&buf).map(Some),
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				debug!("{}: volume unavailable: {err}", volume.name);
				Ok(None)
			}
			Err(err) => Err(err.into()),
		}
	}

	fn entry(&self, volume: usize, slot: &IndexEntry, record: RecordHeader) -> Option<ArchiveEntry> {
		let length = record.length?;
		Some(ArchiveEntry {
			hash: dgds_hash(&record.name, &self.index.salt),
			name: record.name,
			stored_hash: slot.hash,
			volume,
			offset: u64::from(slot.offset) + RECORD_HEADER_SIZE as u64,
			length,
		})
	}

	/// Finds `name` through the hash table, confirming each candidate by name.
	pub fn resolve_hashed(&self, name: &str) -> Result<Option<ArchiveEntry>, DgdsError> {
		let hash = dgds_hash(name, &self.index.salt);
		for (vi, volume) in self.index.volumes.iter().enumerate() {
			for slot in volume.entries.iter().filter(|slot| slot.hash == hash) {
				let Some(record) = self.read_record(volume, slot)? else {
					break;
				};
				if !record.name.eq_ignore_ascii_case(name) {
					debug!("{name}: hash collision with {}", record.name);
					continue;
				}
				if let Some(entry) = self.entry(vi, slot, record) {
					return Ok(Some(entry));
				}
			}
		}
		Ok(None)
	}

	/// Finds `name` by reading every record header and comparing names.
	pub fn resolve_scan(&self, name: &str) -> Result<Option<ArchiveEntry>, DgdsError> {
		for (vi, volume) in self.index.volumes.iter().enumerate() {
			for slot in &volume.entries {
				let Some(record) = self.read_record(volume, slot)? else {
					break;
				};
				if !record.name.eq_ignore_ascii_case(name) {
					continue;
				}
				let Some(entry) = self.entry(vi, slot, record) else {
					continue;
				};
				if !entry.hash_matches() {
					warn!(
						"{}: stored hash {:08X} differs from {:08X}",
						entry.name, entry.stored_hash, entry.hash
					);
				}
				return Ok(Some(entry));
			}
		}
		Ok(None)
	}

	/// Finds `name`, trying the hash table first and falling back to a scan.
	///
	/// Returns `None` when no live record carries the name.
	pub fn resolve(&self, name: &str) -> Result<Option<ArchiveEntry>, DgdsError> {
		if let Some(entry) = self.resolve_hashed(name)? {
			return Ok(Some(entry));
		}
		self.resolve_scan(name)
	}

	/// Reads the payload of a resolved entry.
	///
	/// A record claiming more bytes than its volume holds is an error.
	pub fn read(&self, entry: &ArchiveEntry) -> Result<Vec<u8>, DgdsError> {
		let volume = &self.index.volumes[entry.volume];
		let available = self.source.volume_len(&volume.name)?.saturating_sub(entry.offset);
		if u64::from(entry.length) > available {
			return Err(DgdsError::SizeLimitExceeded {
				file_type: FileType::Volume,
				declared: entry.length as usize,
				limit: usize::try_from(available).unwrap_or(usize::MAX),
			});
		}
		let mut data = vec![0u8; entry.length as usize];
		self.source.read_at(&volume.name, entry.offset, &mut data)?;
		Ok(data)
	}

	/// Resolves and reads `name`.
	pub fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>, DgdsError> {
		match self.resolve(name)? {
			Some(entry) => self.read(&entry).map(Some),
			None => Ok(None),
		}
	}

	/// Lists every live record, in index order. Tombstones are skipped.
	pub fn entries(&self) -> Result<Vec<ArchiveEntry>, DgdsError> {
		let mut entries = Vec::with_capacity(self.index.file_count());
		for (vi, volume) in self.index.volumes.iter().enumerate() {
			for slot in &volume.entries {
				let Some(record) = self.read_record(volume, slot)? else {
					break;
				};
				match self.entry(vi, slot, record) {
					Some(entry) => entries.push(entry),
					None => debug!("{}: tombstone at {}", volume.name, slot.offset),
				}
			}
		}
		Ok(entries)
	}

	/// Name of the volume at `index`.
	pub fn volume_name(&self, index: usize) -> Option<&str> {
		self.index.volumes.get(index).map(|v| v.name.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SALT: Salt = [0, 3, 5, 9];

	fn fixture() -> Archive {
		ArchiveBuilder::new(SALT)
			.volume("RESOURCE.001")
			.file("INTRO.TTM", b"intro".to_vec())
			.tombstone("DRAGON.FNT")
			.file("DRAGON.FNT", b"font bytes".to_vec())
			.volume("RESOURCE.002")
			.file("TITLE.SCR", vec![7; 32])
			.build_archive()
	}

	#[test_log::test]
	fn test_hash_and_scan_agree() {
		let archive = fixture();
		let hashed = archive.resolve_hashed("DRAGON.FNT").unwrap().unwrap();
		let scanned = archive.resolve_scan("dragon.fnt").unwrap().unwrap();
		assert_eq!(hashed.offset, scanned.offset);
		assert_eq!(hashed, archive.resolve("Dragon.Fnt").unwrap().unwrap());
		assert_eq!(archive.read(&hashed).unwrap(), b"font bytes");
	}

	#[test]
	fn test_entry_in_second_volume() {
		let archive = fixture();
		let entry = archive.resolve("TITLE.SCR").unwrap().unwrap();
		assert_eq!(entry.volume, 1);
		assert_eq!(entry.offset, RECORD_HEADER_SIZE as u64);
		assert_eq!(archive.volume_name(entry.volume), Some("RESOURCE.002"));
		assert_eq!(archive.read_file("TITLE.SCR").unwrap().unwrap(), vec![7; 32]);
	}

	#[test]
	fn test_missing_file_is_not_an_error() {
		let archive = fixture();
		assert!(archive.resolve("NOPE.BMP").unwrap().is_none());
		assert!(archive.read_file("NOPE.BMP").unwrap().is_none());
	}

	#[test_log::test]
	fn test_stale_hash_falls_back_to_scan() {
		let archive = ArchiveBuilder::new(SALT)
			.volume("RESOURCE.001")
			.file_with_hash("DRAGON.FNT", b"font".to_vec(), 0x1234_5678)
			.build_archive();

		assert!(archive.resolve_hashed("DRAGON.FNT").unwrap().is_none());
		let entry = archive.resolve("DRAGON.FNT").unwrap().unwrap();
		assert!(!entry.hash_matches());
		assert_eq!(entry.stored_hash, 0x1234_5678);
		assert_eq!(archive.read(&entry).unwrap(), b"font");
	}

	#[test]
	fn test_hash_collision_checks_names() {
		let collide = dgds_hash("DRAGON.FNT", &SALT);
		let archive = ArchiveBuilder::new(SALT)
			.volume("RESOURCE.001")
			.file_with_hash("OTHER.BMP", b"other".to_vec(), collide)
			.file("DRAGON.FNT", b"font".to_vec())
			.build_archive();

		let entry = archive.resolve_hashed("DRAGON.FNT").unwrap().unwrap();
		assert_eq!(entry.name, "DRAGON.FNT");
		assert_eq!(archive.read(&entry).unwrap(), b"font");
	}

	#[test]
	fn test_entries_skip_tombstones() {
		let archive = fixture();
		let names: Vec<_> = archive.entries().unwrap().into_iter().map(|e| e.name).collect();
		assert_eq!(names, ["INTRO.TTM", "DRAGON.FNT", "TITLE.SCR"]);
	}

	#[test]
	fn test_missing_volume_is_skipped() {
		let builder = ArchiveBuilder::new(SALT).volume("RESOURCE.001").file("A.TTM", b"a".to_vec());
		let (index, _) = builder.build();
		let archive = Archive::new(index, MemorySource::new());
		assert!(archive.resolve("A.TTM").unwrap().is_none());
		assert!(archive.entries().unwrap().is_empty());
	}

	#[test]
	fn test_length_past_volume_end_is_rejected() {
		let (index, mut volumes) = ArchiveBuilder::new(SALT)
			.volume("RESOURCE.001")
			.file("BIG.SCR", vec![1; 8])
			.build();
		let (name, bytes) = &mut volumes[0];
		bytes[13..17].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
		let mut source = MemorySource::new();
		source.insert(name, bytes.clone());

		let archive = Archive::new(index, source);
		let entry = archive.resolve("BIG.SCR").unwrap().unwrap();
		assert_eq!(entry.length, 0xFFFF_FFF0);
		assert!(matches!(
			archive.read(&entry),
			Err(DgdsError::SizeLimitExceeded {
				file_type: FileType::Volume,
				limit: 8,
				..
			})
		));
	}
}
