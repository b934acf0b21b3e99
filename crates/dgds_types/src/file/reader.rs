//! Bounds-checked little/big-endian cursor over a byte slice.

use crate::file::{DgdsError, FileType};

/// A forward cursor over borrowed bytes.
///
/// Every read is bounds-checked and reports [`DgdsError::InsufficientData`] tagged
/// with the [`FileType`] the reader was created for.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	pos: usize,
	file_type: FileType,
}

impl<'a> ByteReader<'a> {
	/// Creates a reader positioned at the start of `data`.
	pub fn new(data: &'a [u8], file_type: FileType) -> Self {
		Self {
			data,
			pos: 0,
			file_type,
		}
	}

	/// Current offset from the start of the data.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Number of unread bytes.
	pub fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	/// Returns `true` when every byte has been read.
	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// Moves the cursor to an absolute offset.
	pub fn seek(&mut self, pos: usize) -> Result<(), DgdsError> {
		if pos > self.data.len() {
			return Err(DgdsError::insufficient_data(self.file_type, pos, self.data.len()));
		}
		self.pos = pos;
		Ok(())
	}

	/// Skips `count` bytes.
	pub fn skip(&mut self, count: usize) -> Result<(), DgdsError> {
		self.read_bytes(count).map(|_| ())
	}

	/// Reads `count` bytes as a borrowed slice.
	pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DgdsError> {
		if count > self.remaining() {
			return Err(DgdsError::insufficient_data(
				self.file_type,
				self.pos + count,
				self.data.len(),
			));
		}
		let bytes = &self.data[self.pos..self.pos + count];
		self.pos += count;
		Ok(bytes)
	}

	/// Reads a fixed-size array.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DgdsError> {
		let bytes = self.read_bytes(N)?;
		let mut out = [0u8; N];
		out.copy_from_slice(bytes);
		Ok(out)
	}

	/// Consumes and returns everything left.
	pub fn rest(&mut self) -> &'a [u8] {
		let bytes = &self.data[self.pos..];
		self.pos = self.data.len();
		bytes
	}

	/// Reads one byte.
	pub fn read_u8(&mut self) -> Result<u8, DgdsError> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Reads a little-endian `u16`.
	pub fn read_u16_le(&mut self) -> Result<u16, DgdsError> {
		self.read_array().map(u16::from_le_bytes)
	}

	/// Reads a little-endian `i16`.
	pub fn read_i16_le(&mut self) -> Result<i16, DgdsError> {
		self.read_array().map(i16::from_le_bytes)
	}

	/// Reads a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32, DgdsError> {
		self.read_array().map(u32::from_le_bytes)
	}

	/// Reads a big-endian `u16`.
	pub fn read_u16_be(&mut self) -> Result<u16, DgdsError> {
		self.read_array().map(u16::from_be_bytes)
	}

	/// Reads a big-endian `u32`.
	pub fn read_u32_be(&mut self) -> Result<u32, DgdsError> {
		self.read_array().map(u32::from_be_bytes)
	}

	/// Reads a NUL-terminated string, consuming the terminator.
	pub fn read_cstring(&mut self) -> Result<String, DgdsError> {
		let rest = &self.data[self.pos..];
		let Some(len) = rest.iter().position(|&b| b == 0) else {
			return Err(DgdsError::insufficient_data(
				self.file_type,
				self.data.len() + 1,
				self.data.len(),
			));
		};
		let text = fixed_str(&rest[..len]);
		self.pos += len + 1;
		Ok(text)
	}

	/// Reads a fixed-width, NUL-padded name field.
	pub fn read_fixed_str(&mut self, width: usize) -> Result<String, DgdsError> {
		self.read_bytes(width).map(fixed_str)
	}
}

/// Decodes bytes up to the first NUL as text.
pub fn fixed_str(bytes: &[u8]) -> String {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	String::from_utf8_lossy(&bytes[..end]).into_owned()
}
