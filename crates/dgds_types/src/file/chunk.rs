//! Tagged chunk streams.
//!
//! ## Layout
//!
//! | Offset | Size | Field                                          |
//! |--------|------|------------------------------------------------|
//! | 0x00   | 3    | tag characters                                 |
//! | 0x03   | 1    | `:` terminator                                 |
//! | 0x04   | 4    | size (LE); bit 31 set marks a container chunk  |
//!
//! A container chunk carries no payload. Its size covers the chunks grouped under
//! it, and its tag becomes the parent of every leaf that follows until the next
//! container header. A leaf chunk is followed by `size` payload bytes; when the
//! [`ProfileTable`] lists its tag as compressed for the file extension, the payload
//! starts with a [`Compression`] selector and a `u32` unpacked size.

use std::borrow::Cow;

use log::{Level, log_enabled, trace};

use crate::file::codec::{self, Compression};
use crate::file::profile::{ChunkTag, Extension, ProfileTable};
use crate::file::{DgdsError, FileType};

/// Size of a chunk header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Size-field bit marking a container chunk.
pub const CONTAINER_FLAG: u32 = 0x8000_0000;

/// Size of the selector + unpacked-size prefix on compressed payloads.
pub const PACKED_PREFIX_SIZE: usize = 5;

/// Number of payload bytes shown by trace logging.
const TRACE_BYTES: usize = 32;

/// One decoded chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
	/// Chunk tag
	pub tag: ChunkTag,
	/// Declared size with the container flag masked off
	pub size: u32,
	/// Whether the chunk groups the chunks after it
	pub container: bool,
	/// Stream offset of the header
	pub offset: usize,
}

impl ChunkHeader {
	/// Parses a header found at `offset`.
	pub fn parse(bytes: &[u8; HEADER_SIZE], offset: usize) -> Result<Self, DgdsError> {
		if bytes[3] != b':' {
			let mut tag = [0u8; 4];
			tag.copy_from_slice(&bytes[..4]);
			return Err(DgdsError::InvalidChunkHeader {
				offset,
				tag,
			});
		}
		let raw = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
		Ok(Self {
			tag: ChunkTag::new([bytes[0], bytes[1], bytes[2]]),
			size: raw & !CONTAINER_FLAG,
			container: raw & CONTAINER_FLAG != 0,
			offset,
		})
	}

	/// Serializes the header.
	pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
		let mut out = [0u8; HEADER_SIZE];
		out[..3].copy_from_slice(self.tag.as_bytes());
		out[3] = b':';
		let mut raw = self.size & !CONTAINER_FLAG;
		if self.container {
			raw |= CONTAINER_FLAG;
		}
		out[4..].copy_from_slice(&raw.to_le_bytes());
		out
	}
}

/// A chunk together with its decoded payload.
#[derive(Debug, Clone)]
pub struct Chunk<'a> {
	/// Header as read from the stream
	pub header: ChunkHeader,
	/// Most recent container tag before this chunk
	pub parent: Option<ChunkTag>,
	/// Payload, `None` for containers
	pub data: Option<Cow<'a, [u8]>>,
}

impl Chunk<'_> {
	/// Chunk tag.
	pub fn tag(&self) -> ChunkTag {
		self.header.tag
	}

	/// Whether this is a container chunk.
	pub fn is_container(&self) -> bool {
		self.header.container
	}

	/// Payload bytes, empty for containers.
	pub fn bytes(&self) -> &[u8] {
		self.data.as_deref().unwrap_or_default()
	}
}

/// Reads chunks one at a time from a file payload.
///
/// After each payload the cursor sits at the next header, whether or not the
/// payload was decoded successfully. The [`Iterator`] impl stops after the first
/// error.
#[derive(Debug)]
pub struct ChunkReader<'a> {
	data: &'a [u8],
	pos: usize,
	extension: Extension,
	profiles: &'a ProfileTable,
	parent: Option<ChunkTag>,
	failed: bool,
}

impl<'a> ChunkReader<'a> {
	/// Creates a reader over the payload of a file with extension `extension`.
	pub fn new(data: &'a [u8], extension: Extension, profiles: &'a ProfileTable) -> Self {
		Self {
			data,
			pos: 0,
			extension,
			profiles,
			parent: None,
			failed: false,
		}
	}

	/// Current stream offset.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Tag of the most recent container chunk.
	pub fn parent(&self) -> Option<ChunkTag> {
		self.parent
	}

	/// Reads the next header, or `None` at the end of the stream.
	pub fn read_header(&mut self) -> Result<Option<ChunkHeader>, DgdsError> {
		let remaining = self.data.len() - self.pos;
		if remaining == 0 {
			return Ok(None);
		}
		if remaining < HEADER_SIZE {
			return Err(DgdsError::insufficient_data(FileType::Chunk, self.pos + HEADER_SIZE, self.data.len()));
		}

		let mut bytes = [0u8; HEADER_SIZE];
		bytes.copy_from_slice(&self.data[self.pos..self.pos + HEADER_SIZE]);
		let header = ChunkHeader::parse(&bytes, self.pos)?;
		self.pos += HEADER_SIZE;
		Ok(Some(header))
	}

	/// Reads the payload belonging to `header`.
	///
	/// Containers have no payload; they become the parent of the chunks that follow.
	pub fn read_payload(&mut self, header: &ChunkHeader) -> Result<Option<Cow<'a, [u8]>>, DgdsError> {
		if header.container {
			self.parent = Some(header.tag);
			return Ok(None);
		}

		let size = header.size as usize;
		let remaining = self.data.len() - self.pos;
		if size > remaining {
			self.pos = self.data.len();
			return Err(DgdsError::insufficient_data(FileType::Chunk, size, remaining));
		}
		let body = &self.data[self.pos..self.pos + size];
		self.pos += size;

		if log_enabled!(Level::Trace) {
			trace!(
				"{}:{} {} bytes at {}: {}",
				self.extension,
				header.tag,
				size,
				header.offset,
				hex::encode(&body[..size.min(TRACE_BYTES)])
			);
		}

		if !self.profiles.is_packed(self.extension, header.tag) {
			return Ok(Some(Cow::Borrowed(body)));
		}

		if size < PACKED_PREFIX_SIZE {
			return Err(DgdsError::insufficient_data(FileType::Chunk, PACKED_PREFIX_SIZE, size));
		}
		let method = Compression::try_from(body[0])?;
		let unpacked = u32::from_le_bytes([body[1], body[2], body[3], body[4]]) as usize;
		trace!("{}:{} {method} {} -> {unpacked}", self.extension, header.tag, size - PACKED_PREFIX_SIZE);
		codec::decompress(method, &body[PACKED_PREFIX_SIZE..], unpacked).map(|data| Some(Cow::Owned(data)))
	}

	/// Reads the next header and its payload.
	pub fn next_chunk(&mut self) -> Result<Option<Chunk<'a>>, DgdsError> {
		let Some(header) = self.read_header()? else {
			return Ok(None);
		};
		let parent = self.parent;
		let data = self.read_payload(&header)?;
		Ok(Some(Chunk {
			header,
			parent,
			data,
		}))
	}
}

impl<'a> Iterator for ChunkReader<'a> {
	type Item = Result<Chunk<'a>, DgdsError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}
		match self.next_chunk() {
			Ok(chunk) => chunk.map(Ok),
			Err(err) => {
				self.failed = true;
				Some(Err(err))
			}
		}
	}
}

/// Assembles chunk streams.
///
/// # Examples
///
/// ```
/// use dgds_types::file::chunk::ChunkBuilder;
/// use dgds_types::file::codec::Compression;
/// use dgds_types::file::profile::ChunkTag;
///
/// let stream = ChunkBuilder::new()
/// 	.leaf(ChunkTag::VER, b"4.09\0")
/// 	.packed_leaf(ChunkTag::TT3, Compression::Rle, &[0; 64])
/// 	.build();
/// assert_eq!(&stream[..4], b"VER:");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChunkBuilder {
	bytes: Vec<u8>,
}

impl ChunkBuilder {
	/// Creates an empty stream.
	pub fn new() -> Self {
		Self::default()
	}

	fn header(&mut self, tag: ChunkTag, size: usize, container: bool) {
		let header = ChunkHeader {
			tag,
			size: size as u32,
			container,
			offset: self.bytes.len(),
		};
		self.bytes.extend_from_slice(&header.to_bytes());
	}

	/// Appends a leaf chunk with a raw payload.
	pub fn leaf(mut self, tag: ChunkTag, data: &[u8]) -> Self {
		self.header(tag, data.len(), false);
		self.bytes.extend_from_slice(data);
		self
	}

	/// Appends a leaf chunk compressed with `method`, including the prefix.
	pub fn packed_leaf(mut self, tag: ChunkTag, method: Compression, data: &[u8]) -> Self {
		let packed = codec::compress(method, data);
		self.header(tag, PACKED_PREFIX_SIZE + packed.len(), false);
		self.bytes.push(method.into());
		self.bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
		self.bytes.extend_from_slice(&packed);
		self
	}

	/// Appends a container chunk grouping `children`.
	pub fn container(mut self, tag: ChunkTag, children: ChunkBuilder) -> Self {
		self.header(tag, children.bytes.len(), true);
		self.bytes.extend_from_slice(&children.bytes);
		self
	}

	/// Returns the assembled stream.
	pub fn build(self) -> Vec<u8> {
		self.bytes
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bitmap_stream() -> Vec<u8> {
		let mut inf = Vec::new();
		inf.extend_from_slice(&1u16.to_le_bytes());
		inf.extend_from_slice(&4u16.to_le_bytes());
		inf.extend_from_slice(&2u16.to_le_bytes());

		ChunkBuilder::new()
			.container(
				ChunkTag::BMP,
				ChunkBuilder::new()
					.leaf(ChunkTag::INF, &inf)
					.packed_leaf(ChunkTag::BIN, Compression::Rle, &[0x11; 4])
					.packed_leaf(ChunkTag::VGA, Compression::Lzw, &[0x22, 0x33, 0x22, 0x33]),
			)
			.leaf(ChunkTag::MTX, &[1, 0, 1, 0, 0, 0])
			.build()
	}

	#[test_log::test]
	fn test_traversal_visits_fixture_tags() {
		let data = bitmap_stream();
		let profiles = ProfileTable::builtin();
		let chunks: Vec<_> =
			ChunkReader::new(&data, Extension::BMP, &profiles).collect::<Result<_, _>>().unwrap();

		let visited: Vec<_> = chunks.iter().map(|c| (c.tag().to_string(), c.is_container(), c.parent)).collect();
		assert_eq!(
			visited,
			vec![
				("BMP".to_string(), true, None),
				("INF".to_string(), false, Some(ChunkTag::BMP)),
				("BIN".to_string(), false, Some(ChunkTag::BMP)),
				("VGA".to_string(), false, Some(ChunkTag::BMP)),
				("MTX".to_string(), false, Some(ChunkTag::BMP)),
			]
		);
		assert_eq!(chunks[2].bytes(), &[0x11; 4]);
		assert_eq!(chunks[3].bytes(), &[0x22, 0x33, 0x22, 0x33]);
		assert!(matches!(chunks[1].data, Some(Cow::Borrowed(_))));
	}

	#[test]
	fn test_consumed_bytes_match_declared_sizes() {
		let data = bitmap_stream();
		let profiles = ProfileTable::builtin();
		let mut reader = ChunkReader::new(&data, Extension::BMP, &profiles);

		let mut consumed = 0;
		let mut container_size = 0;
		while let Some(header) = reader.read_header().unwrap() {
			let start = reader.position();
			reader.read_payload(&header).unwrap();
			consumed += HEADER_SIZE + (reader.position() - start);
			if header.container {
				container_size = header.size as usize;
			} else {
				assert_eq!(reader.position() - start, header.size as usize);
			}
		}
		assert_eq!(consumed, data.len());
		// Container header + grouped chunks + trailing MTX leaf
		assert_eq!(HEADER_SIZE + container_size + HEADER_SIZE + 6, data.len());
	}

	#[test]
	fn test_missing_terminator_stops_parsing() {
		let mut data = bitmap_stream();
		data[3] = b'!';
		let profiles = ProfileTable::builtin();
		let mut reader = ChunkReader::new(&data, Extension::BMP, &profiles);
		assert!(matches!(
			reader.next(),
			Some(Err(DgdsError::InvalidChunkHeader {
				offset: 0,
				tag: [b'B', b'M', b'P', b'!'],
			}))
		));
		assert!(reader.next().is_none());
	}

	#[test]
	fn test_truncated_payload_is_an_error() {
		let data = ChunkBuilder::new().leaf(ChunkTag::TAG, &[0; 16]).build();
		let profiles = ProfileTable::builtin();
		let result: Result<Vec<_>, _> = ChunkReader::new(&data[..12], Extension::TTM, &profiles).collect();
		assert!(matches!(result, Err(DgdsError::InsufficientData { .. })));

		let result: Result<Vec<_>, _> = ChunkReader::new(&data[..5], Extension::TTM, &profiles).collect();
		assert!(result.is_err());
	}

	#[test]
	fn test_unknown_method_leaves_cursor_at_next_header() {
		let mut data = ChunkBuilder::new()
			.packed_leaf(ChunkTag::TT3, Compression::None, b"code")
			.leaf(ChunkTag::TAG, &[0, 0])
			.build();
		data[HEADER_SIZE] = 9;

		let profiles = ProfileTable::builtin();
		let mut reader = ChunkReader::new(&data, Extension::TTM, &profiles);
		let header = reader.read_header().unwrap().unwrap();
		assert!(matches!(
			reader.read_payload(&header),
			Err(DgdsError::UnsupportedCompression {
				method: 9,
				..
			})
		));
		let next = reader.next_chunk().unwrap().unwrap();
		assert_eq!(next.tag(), ChunkTag::TAG);
	}

	#[test]
	fn test_oversized_unpacked_size_is_rejected() {
		let mut data = ChunkBuilder::new()
			.packed_leaf(ChunkTag::TT3, Compression::Lzw, b"")
			.leaf(ChunkTag::TAG, &[0, 0])
			.build();
		data[HEADER_SIZE + 1..HEADER_SIZE + 5].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

		let profiles = ProfileTable::builtin();
		let mut reader = ChunkReader::new(&data, Extension::TTM, &profiles);
		let header = reader.read_header().unwrap().unwrap();
		assert!(matches!(
			reader.read_payload(&header),
			Err(DgdsError::SizeLimitExceeded {
				declared: 0xFFFF_FFF0,
				..
			})
		));
		assert_eq!(reader.next_chunk().unwrap().unwrap().tag(), ChunkTag::TAG);
	}

	#[test]
	fn test_unprofiled_extension_reads_raw() {
		let data = ChunkBuilder::new().packed_leaf(ChunkTag::TT3, Compression::Rle, &[5; 10]).build();
		let profiles = ProfileTable::empty();
		let chunk = ChunkReader::new(&data, Extension::TTM, &profiles).next_chunk().unwrap().unwrap();
		// Prefix and coded bytes come back untouched
		assert_eq!(chunk.bytes()[0], 1);
		assert_eq!(chunk.bytes().len(), chunk.header.size as usize);
	}

	#[test]
	fn test_header_round_trip() {
		let header = ChunkHeader {
			tag: ChunkTag::SCR,
			size: 0x1234,
			container: true,
			offset: 0,
		};
		let bytes = header.to_bytes();
		assert_eq!(&bytes[..4], b"SCR:");
		assert_eq!(bytes[7], 0x80);
		assert_eq!(ChunkHeader::parse(&bytes, 0).unwrap(), header);
	}
}
