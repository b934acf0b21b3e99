//! Archive index files.
//!
//! ## Layout
//!
//! ```text
//! [4-byte salt][u16 volume count]
//! per volume: [13-byte name][u16 file count]
//!     per file: [u32 hash][u32 record offset]
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use super::hash::Salt;
use super::volume::{NAME_FIELD_SIZE, name_field};
use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

/// One file slot in a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
	/// Stored name hash
	pub hash: u32,
	/// Offset of the record header inside the volume
	pub offset: u32,
}

/// The slots belonging to one volume file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeIndex {
	/// Volume file name
	pub name: String,
	/// File slots, in index order
	pub entries: Vec<IndexEntry>,
}

/// A parsed index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
	/// Hash salt
	pub salt: Salt,
	/// Volumes, in index order
	pub volumes: Vec<VolumeIndex>,
}

impl IndexFile {
	/// Reads and parses an index file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, DgdsError> {
		let data = fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses an index from bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Index);
		let salt = reader.read_array()?;
		let volume_count = reader.read_u16_le()?;

		let mut volumes = Vec::with_capacity(usize::from(volume_count));
		for _ in 0..volume_count {
			let name = reader.read_fixed_str(NAME_FIELD_SIZE)?;
			let file_count = reader.read_u16_le()?;
			let entries = (0..file_count)
				.map(|_| {
					Ok(IndexEntry {
						hash: reader.read_u32_le()?,
						offset: reader.read_u32_le()?,
					})
				})
				.collect::<Result<Vec<_>, DgdsError>>()?;
			volumes.push(VolumeIndex {
				name,
				entries,
			});
		}

		Ok(Self {
			salt,
			volumes,
		})
	}

	/// Serializes the index.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&self.salt);
		out.extend_from_slice(&(self.volumes.len() as u16).to_le_bytes());
		for volume in &self.volumes {
			out.extend_from_slice(&name_field(&volume.name));
			out.extend_from_slice(&(volume.entries.len() as u16).to_le_bytes());
			for entry in &volume.entries {
				out.extend_from_slice(&entry.hash.to_le_bytes());
				out.extend_from_slice(&entry.offset.to_le_bytes());
			}
		}
		out
	}

	/// Total number of file slots across all volumes.
	pub fn file_count(&self) -> usize {
		self.volumes.iter().map(|v| v.entries.len()).sum()
	}
}

impl fmt::Display for IndexFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"salt {:02X?}, {} volumes, {} files",
			self.salt,
			self.volumes.len(),
			self.file_count()
		)
	}
}
