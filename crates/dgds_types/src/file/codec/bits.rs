//! LSB-first bit cursor and writer shared by the LZW codec.

/// Reads fixed-width codes from a byte slice, least-significant bit first.
///
/// Codes may straddle byte boundaries.
#[derive(Debug)]
pub(crate) struct BitReader<'a> {
	data: &'a [u8],
	bit_pos: usize,
}

impl<'a> BitReader<'a> {
	pub(crate) fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			bit_pos: 0,
		}
	}

	/// Reads `width` bits (at most 16), or `None` if the input is exhausted.
	pub(crate) fn read(&mut self, width: u32) -> Option<u16> {
		let width = width as usize;
		if self.bit_pos + width > self.data.len() * 8 {
			return None;
		}

		let mut value = 0u16;
		for i in 0..width {
			let pos = self.bit_pos + i;
			let bit = (self.data[pos >> 3] >> (pos & 7)) & 1;
			value |= u16::from(bit) << i;
		}
		self.bit_pos += width;
		Some(value)
	}

	/// Number of input bytes touched so far, counting a partially read byte.
	pub(crate) fn bytes_consumed(&self) -> usize {
		self.bit_pos.div_ceil(8)
	}
}

/// Packs fixed-width codes into bytes, least-significant bit first.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
	bytes: Vec<u8>,
	bit_pos: usize,
}

impl BitWriter {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn write(&mut self, value: u16, width: u32) {
		for i in 0..width as usize {
			if self.bit_pos >> 3 == self.bytes.len() {
				self.bytes.push(0);
			}
			if (value >> i) & 1 != 0 {
				self.bytes[self.bit_pos >> 3] |= 1 << (self.bit_pos & 7);
			}
			self.bit_pos += 1;
		}
	}

	/// Returns the packed bytes; the last byte is zero-padded.
	pub(crate) fn finish(self) -> Vec<u8> {
		self.bytes
	}
}
