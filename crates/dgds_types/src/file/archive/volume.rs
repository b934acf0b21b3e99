//! Volume files and the sources they are read from.
//!
//! Every file stored in a volume is preceded by a record header:
//!
//! | Offset | Size | Field                                        |
//! |--------|------|----------------------------------------------|
//! | 0x00   | 13   | file name, NUL padded (12 characters max)    |
//! | 0x0D   | 4    | payload length (LE), `0xFFFFFFFF` = tombstone |

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

/// Width of name fields in index and volume files.
pub const NAME_FIELD_SIZE: usize = 13;

/// Longest file name a name field can hold.
pub const FILENAME_MAX: usize = NAME_FIELD_SIZE - 1;

/// Size of a record header.
pub const RECORD_HEADER_SIZE: usize = NAME_FIELD_SIZE + 4;

/// Length value marking a deleted or placeholder record.
pub const TOMBSTONE: u32 = 0xFFFF_FFFF;

/// Encodes a name into a NUL-padded field, truncating past [`FILENAME_MAX`].
pub fn name_field(name: &str) -> [u8; NAME_FIELD_SIZE] {
	let mut field = [0u8; NAME_FIELD_SIZE];
	let bytes = name.as_bytes();
	let len = bytes.len().min(FILENAME_MAX);
	field[..len].copy_from_slice(&bytes[..len]);
	field
}

/// Header in front of each stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
	/// Stored file name
	pub name: String,
	/// Payload length, `None` for tombstones
	pub length: Option<u32>,
}

impl RecordHeader {
	/// Parses a record header.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Volume);
		let name = reader.read_fixed_str(NAME_FIELD_SIZE)?;
		let length = reader.read_u32_le()?;
		Ok(Self {
			name,
			length: (length != TOMBSTONE).then_some(length),
		})
	}

	/// Serializes the record header.
	pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
		let mut out = [0u8; RECORD_HEADER_SIZE];
		out[..NAME_FIELD_SIZE].copy_from_slice(&name_field(&self.name));
		out[NAME_FIELD_SIZE..].copy_from_slice(&self.length.unwrap_or(TOMBSTONE).to_le_bytes());
		out
	}

	/// Whether the record is a tombstone.
	pub fn is_tombstone(&self) -> bool {
		self.length.is_none()
	}
}

/// Random-access reads from named volume files.
pub trait VolumeSource: fmt::Debug {
	/// Fills `buf` with bytes of `volume` starting at `offset`.
	///
	/// A volume that does not exist reports [`io::ErrorKind::NotFound`].
	fn read_at(&self, volume: &str, offset: u64, buf: &mut [u8]) -> io::Result<()>;

	/// Size of `volume` in bytes.
	fn volume_len(&self, volume: &str) -> io::Result<u64>;
}

/// Volumes stored as files in one directory.
///
/// Volume names are matched case-insensitively, as index files often disagree with
/// the case used on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	/// Creates a source reading volumes from `root`.
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
		}
	}

	/// Directory the volumes are read from.
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn locate(&self, volume: &str) -> io::Result<PathBuf> {
		let direct = self.root.join(volume);
		if direct.is_file() {
			return Ok(direct);
		}
		for entry in fs::read_dir(&self.root)? {
			let entry = entry?;
			if entry.file_name().to_string_lossy().eq_ignore_ascii_case(volume) {
				return Ok(entry.path());
			}
		}
		Err(io::Error::new(io::ErrorKind::NotFound, format!("volume {volume} not found")))
	}
}

impl VolumeSource for DirectorySource {
	fn read_at(&self, volume: &str, offset: u64, buf: &mut [u8]) -> io::Result<()> {
		let mut file = fs::File::open(self.locate(volume)?)?;
		file.seek(SeekFrom::Start(offset))?;
		file.read_exact(buf)
	}

	fn volume_len(&self, volume: &str) -> io::Result<u64> {
		Ok(fs::metadata(self.locate(volume)?)?.len())
	}
}

/// Volumes held in memory, keyed by upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	volumes: HashMap<String, Vec<u8>>,
}

impl MemorySource {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a volume.
	pub fn insert(&mut self, name: &str, data: Vec<u8>) {
		self.volumes.insert(name.to_ascii_uppercase(), data);
	}

	/// Returns the bytes of a volume.
	pub fn get(&self, name: &str) -> Option<&[u8]> {
		self.volumes.get(&name.to_ascii_uppercase()).map(Vec::as_slice)
	}
}

impl VolumeSource for MemorySource {
	fn read_at(&self, volume: &str, offset: u64, buf: &mut [u8]) -> io::Result<()> {
		let data = self
			.get(volume)
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("volume {volume} not found")))?;
		let start = usize::try_from(offset).unwrap_or(usize::MAX);
		let end = start.saturating_add(buf.len());
		let bytes = data.get(start..end).ok_or_else(|| {
			io::Error::new(io::ErrorKind::UnexpectedEof, format!("{volume}: read past end at {offset}"))
		})?;
		buf.copy_from_slice(bytes);
		Ok(())
	}

	fn volume_len(&self, volume: &str) -> io::Result<u64> {
		self.get(volume)
			.map(|data| data.len() as u64)
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("volume {volume} not found")))
	}
}
