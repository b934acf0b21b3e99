//! Files stored without chunk framing.

use crate::file::profile::Extension;
use crate::file::reader::{ByteReader, fixed_str};
use crate::file::{DgdsError, FileType};

/// One record of an `RST` file: an index and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstRecord {
	/// Record index; 0 terminates a list
	pub index: u16,
	/// Record fields
	pub values: Vec<u16>,
}

/// Tile size and volume header of an Amiga bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmigaBitmapHeader {
	/// Unpacked size declared in the tile header
	pub unpacked_size: u32,
	/// `(width, height)` of every tile
	pub tiles: Vec<(u16, u16)>,
	/// Version string following the tile list
	pub version: String,
	/// Unpacked size of the pixel block
	pub block_unpacked: u32,
	/// Packed size of the pixel block
	pub block_packed: u32,
}

/// A decoded flat file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatFile {
	/// Two record lists, 7 then 2 fields per record
	Rst {
		/// Leading mark word
		mark: u32,
		/// First list, terminator excluded
		records: Vec<RstRecord>,
		/// Second list, terminator included
		links: Vec<RstRecord>,
	},
	/// Line-oriented text list (`VIN`, `AMG`)
	Lines(Vec<String>),
	/// Amiga bitmap header; pixel data stays raw
	AmigaBitmap {
		/// Parsed header
		header: AmigaBitmapHeader,
		/// Bytes after the header
		data: Vec<u8>,
	},
	/// Amiga screen header; bitplanes stay raw
	AmigaScreen {
		/// Four-byte tag
		tag: String,
		/// Rows per plane
		pitch: u16,
		/// Number of bitplanes
		planes: u16,
		/// Bytes after the header
		data: Vec<u8>,
	},
	/// Passed through unchanged (`INS`, `DAT`, anything else)
	Raw(Vec<u8>),
}

impl FlatFile {
	/// Decodes `data` according to the file extension.
	pub fn parse(extension: Extension, data: &[u8]) -> Result<Self, DgdsError> {
		match extension {
			Extension::RST => parse_rst(data),
			Extension::VIN => Ok(Self::Lines(parse_lines(data, false))),
			Extension::AMG => Ok(Self::Lines(parse_lines(data, true))),
			Extension::BMP => parse_amiga_bitmap(data),
			Extension::SCR => parse_amiga_screen(data),
			_ => Ok(Self::Raw(data.to_vec())),
		}
	}
}

fn parse_rst(data: &[u8]) -> Result<FlatFile, DgdsError> {
	let mut reader = ByteReader::new(data, FileType::Flat);
	let mark = reader.read_u32_le()?;

	let mut records = Vec::new();
	while !reader.is_empty() {
		let index = reader.read_u16_le()?;
		if index == 0 {
			break;
		}
		records.push(read_rst_record(&mut reader, index, 7)?);
	}

	let mut links = Vec::new();
	while !reader.is_empty() {
		let index = reader.read_u16_le()?;
		links.push(read_rst_record(&mut reader, index, 2)?);
		if index == 0 {
			break;
		}
	}

	Ok(FlatFile::Rst {
		mark,
		records,
		links,
	})
}

fn read_rst_record(reader: &mut ByteReader<'_>, index: u16, fields: usize) -> Result<RstRecord, DgdsError> {
	let values = (0..fields).map(|_| reader.read_u16_le()).collect::<Result<_, _>>()?;
	Ok(RstRecord {
		index,
		values,
	})
}

fn parse_lines(data: &[u8], stop_at_empty: bool) -> Vec<String> {
	let text = String::from_utf8_lossy(data);
	let mut lines = Vec::new();
	for line in text.lines() {
		let line = line.trim_end_matches('\r');
		if line.is_empty() {
			if stop_at_empty {
				break;
			}
			continue;
		}
		lines.push(line.to_owned());
	}
	lines
}

fn parse_amiga_bitmap(data: &[u8]) -> Result<FlatFile, DgdsError> {
	let mut reader = ByteReader::new(data, FileType::Flat);
	let count = reader.read_u16_be()?;
	let unpacked_size = reader.read_u32_be()?;
	let tiles = (0..count)
		.map(|_| Ok((reader.read_u16_be()?, reader.read_u16_be()?)))
		.collect::<Result<Vec<_>, DgdsError>>()?;
	let version = fixed_str(reader.read_bytes(12)?);
	let block_unpacked = reader.read_u32_be()?;
	let block_packed = reader.read_u32_be()?;

	Ok(FlatFile::AmigaBitmap {
		header: AmigaBitmapHeader {
			unpacked_size,
			tiles,
			version,
			block_unpacked,
			block_packed,
		},
		data: reader.rest().to_vec(),
	})
}

fn parse_amiga_screen(data: &[u8]) -> Result<FlatFile, DgdsError> {
	let mut reader = ByteReader::new(data, FileType::Flat);
	let tag = fixed_str(reader.read_bytes(4)?);
	let pitch = reader.read_u16_be()?;
	let planes = reader.read_u16_be()?;
	Ok(FlatFile::AmigaScreen {
		tag,
		pitch,
		planes,
		data: reader.rest().to_vec(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(values: &[u16]) -> Vec<u8> {
		values.iter().flat_map(|v| v.to_le_bytes()).collect()
	}

	#[test]
	fn test_rst_lists() {
		let mut data = 0x1234u32.to_le_bytes().to_vec();
		data.extend(words(&[5, 1, 2, 3, 4, 5, 6, 7, 0]));
		data.extend(words(&[9, 10, 11, 0, 0, 0]));

		let FlatFile::Rst {
			mark,
			records,
			links,
		} = FlatFile::parse(Extension::RST, &data).unwrap()
		else {
			panic!("expected RST");
		};
		assert_eq!(mark, 0x1234);
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].values, [1, 2, 3, 4, 5, 6, 7]);
		assert_eq!(links.len(), 2);
		assert_eq!(links[1].index, 0);
	}

	#[test]
	fn test_rst_without_links() {
		let mut data = 7u32.to_le_bytes().to_vec();
		data.extend(words(&[0]));
		assert!(matches!(
			FlatFile::parse(Extension::RST, &data).unwrap(),
			FlatFile::Rst { ref records, ref links, .. } if records.is_empty() && links.is_empty()
		));
	}

	#[test]
	fn test_line_lists() {
		let data = b"FIRST\r\n\r\nSECOND\nTHIRD";
		assert_eq!(
			FlatFile::parse(Extension::VIN, data).unwrap(),
			FlatFile::Lines(vec!["FIRST".into(), "SECOND".into(), "THIRD".into()])
		);
		assert_eq!(FlatFile::parse(Extension::AMG, data).unwrap(), FlatFile::Lines(vec!["FIRST".into()]));
	}

	#[test]
	fn test_amiga_headers() {
		let mut bmp = vec![0, 1, 0, 0, 0, 40, 0, 16, 0, 8];
		bmp.extend_from_slice(b"VER.1.00\0\0\0\0");
		bmp.extend_from_slice(&[0, 0, 0, 40, 0, 0, 0, 3, 0xAA, 0xBB, 0xCC]);
		let FlatFile::AmigaBitmap {
			header,
			data,
		} = FlatFile::parse(Extension::BMP, &bmp).unwrap()
		else {
			panic!("expected Amiga bitmap");
		};
		assert_eq!(header.tiles, [(16, 8)]);
		assert_eq!(header.version, "VER.1.00");
		assert_eq!((header.block_unpacked, header.block_packed), (40, 3));
		assert_eq!(data, [0xAA, 0xBB, 0xCC]);

		let scr = [b'S', b'C', b'R', b'N', 0, 200, 0, 5, 1];
		assert_eq!(
			FlatFile::parse(Extension::SCR, &scr).unwrap(),
			FlatFile::AmigaScreen {
				tag: "SCRN".into(),
				pitch: 200,
				planes: 5,
				data: vec![1],
			}
		);
	}

	#[test]
	fn test_raw_passthrough() {
		assert_eq!(FlatFile::parse(Extension::INS, b"FORM").unwrap(), FlatFile::Raw(b"FORM".to_vec()));
	}
}
