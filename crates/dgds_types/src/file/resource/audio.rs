//! Song and sound banks.
//!
//! Audio is handed to the host untouched; these types only gather the blobs and
//! their tables from the chunk stream.

use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

use super::strings::StringTable;

/// Parses an `INF` list of `u16` values filling the whole payload.
pub(crate) fn read_u16_list(data: &[u8], file_type: FileType) -> Result<Vec<u16>, DgdsError> {
	let mut reader = ByteReader::new(data, file_type);
	(0..data.len() / 2).map(|_| reader.read_u16_le()).collect()
}

/// Songs of a `SNG` file, in chunk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongBank {
	/// One MIDI-like blob per `SNG` chunk
	pub songs: Vec<Vec<u8>>,
	/// Values of the `INF` chunk
	pub info: Vec<u16>,
}

impl SongBank {
	/// Song `index`, if present.
	pub fn song(&self, index: usize) -> Option<&[u8]> {
		self.songs.get(index).map(Vec::as_slice)
	}
}

/// Header of a sound bank (`SX` `INF` chunk).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundInfo {
	/// Sample kind
	pub kind: u16,
	/// Sample ids
	pub ids: Vec<u16>,
}

impl SoundInfo {
	/// Parses `u16 kind`, `u16 count`, then `count` ids.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Sound);
		let kind = reader.read_u16_le()?;
		let count = reader.read_u16_le()?;
		let ids = (0..count).map(|_| reader.read_u16_le()).collect::<Result<_, _>>()?;
		Ok(Self {
			kind,
			ids,
		})
	}
}

/// A Macintosh sound bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundBank {
	/// Sample table
	pub info: SoundInfo,
	/// Tag names
	pub tags: StringTable,
	/// Sample file names
	pub names: StringTable,
	/// Sample data blobs, each led by a `u16` id
	pub data: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sound_info() {
		let info = SoundInfo::from_bytes(&[3, 0, 2, 0, 10, 0, 11, 0]).unwrap();
		assert_eq!(info.kind, 3);
		assert_eq!(info.ids, [10, 11]);
		assert!(SoundInfo::from_bytes(&[3, 0, 2, 0, 10, 0]).is_err());
	}

	#[test]
	fn test_u16_list_ignores_odd_byte() {
		assert_eq!(read_u16_list(&[1, 0, 2, 0, 9], FileType::Song).unwrap(), [1, 2]);
	}
}
