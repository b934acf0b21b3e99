//! Bitmap fonts (`FNT` chunks).
//!
//! Two layouts exist. A fixed-width font stores `w, h, first, count` followed by
//! `h` row bytes per glyph, the leftmost pixel in the most significant bit. A
//! proportional font starts with `0xFF` and carries a compressed block holding a
//! `u16` offset and a `u8` width per glyph, then the glyph rows.

use crate::file::codec::{self, Compression};
use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

const PROPORTIONAL_MARKER: u8 = 0xFF;

/// One rendered character as a row-major coverage mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
	/// Width in pixels
	pub width: u8,
	/// Height in pixels
	pub height: u8,
	/// `width * height` flags, `true` where the pixel is set
	pub mask: Vec<bool>,
}

impl Glyph {
	/// Whether pixel `(x, y)` is set.
	pub fn is_set(&self, x: usize, y: usize) -> bool {
		x < usize::from(self.width)
			&& self.mask.get(y * usize::from(self.width) + x).copied().unwrap_or(false)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
	Fixed,
	Proportional {
		offsets: Vec<u16>,
		widths: Vec<u8>,
	},
}

/// A decoded font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
	width: u8,
	height: u8,
	first: u8,
	count: u8,
	layout: Layout,
	data: Vec<u8>,
}

impl Font {
	/// Parses a `FNT` payload, detecting the layout from its first byte.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		match data.first() {
			Some(&PROPORTIONAL_MARKER) => Self::proportional(data),
			Some(_) => Self::fixed(data),
			None => Err(DgdsError::insufficient_data(FileType::Font, 4, 0)),
		}
	}

	fn fixed(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Font);
		let [width, height, first, count] = reader.read_array()?;
		if width > 8 {
			return Err(DgdsError::invalid_value(
				FileType::Font,
				format!("fixed glyph width {width} exceeds 8"),
			));
		}
		let glyphs = reader.read_bytes(usize::from(height) * usize::from(count))?.to_vec();
		Ok(Self {
			width,
			height,
			first,
			count,
			layout: Layout::Fixed,
			data: glyphs,
		})
	}

	fn proportional(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Font);
		reader.skip(1)?;
		let [width, height, unknown, first, count] = reader.read_array()?;
		let size = reader.read_u16_le()?;
		let method = Compression::try_from(reader.read_u8()?)?;
		let unpacked = reader.read_u32_le()? as usize;
		log::trace!(
			"Proportional font {width}x{height} first 0x{first:02X} count {count} unknown 0x{unknown:02X} size {size} {method}"
		);

		let block = codec::decompress(method, reader.rest(), unpacked)?;
		let glyph_count = usize::from(count);
		let mut block_reader = ByteReader::new(&block, FileType::Font);
		let offsets = (0..glyph_count).map(|_| block_reader.read_u16_le()).collect::<Result<Vec<_>, _>>()?;
		let widths = block_reader.read_bytes(glyph_count)?.to_vec();
		let glyphs = block_reader.rest().to_vec();

		Ok(Self {
			width,
			height,
			first,
			count,
			layout: Layout::Proportional {
				offsets,
				widths,
			},
			data: glyphs,
		})
	}

	/// Line height in pixels.
	pub fn height(&self) -> u8 {
		self.height
	}

	/// Widest glyph in pixels.
	pub fn max_width(&self) -> u8 {
		self.width
	}

	/// First character code covered.
	pub fn first_char(&self) -> u8 {
		self.first
	}

	/// Number of glyphs.
	pub fn glyph_count(&self) -> u8 {
		self.count
	}

	/// Whether each glyph has its own width.
	pub fn is_proportional(&self) -> bool {
		matches!(self.layout, Layout::Proportional { .. })
	}

	fn glyph_index(&self, ch: u8) -> Option<usize> {
		let index = ch.checked_sub(self.first)?;
		(index < self.count).then_some(usize::from(index))
	}

	/// Width of `ch`, or `None` if the font does not cover it.
	pub fn char_width(&self, ch: u8) -> Option<u8> {
		let index = self.glyph_index(ch)?;
		match &self.layout {
			Layout::Fixed => Some(self.width),
			Layout::Proportional {
				widths,
				..
			} => widths.get(index).copied(),
		}
	}

	/// Rendered width of `text`; characters outside the font count as zero.
	pub fn text_width(&self, text: &[u8]) -> usize {
		text.iter().filter_map(|&ch| self.char_width(ch)).map(usize::from).sum()
	}

	/// Renders `ch`, or `None` if the font does not cover it or its rows are missing.
	pub fn glyph(&self, ch: u8) -> Option<Glyph> {
		let index = self.glyph_index(ch)?;
		let height = usize::from(self.height);
		let (width, start, pitch) = match &self.layout {
			Layout::Fixed => (self.width, index * height, 1),
			Layout::Proportional {
				offsets,
				widths,
			} => {
				let width = *widths.get(index)?;
				(width, usize::from(*offsets.get(index)?), usize::from(width).div_ceil(8))
			}
		};
		let rows = self.data.get(start..start + pitch * height)?;

		let mut mask = Vec::with_capacity(usize::from(width) * height);
		for row in rows.chunks(pitch) {
			for x in 0..usize::from(width) {
				mask.push(row[x / 8] & (0x80 >> (x % 8)) != 0);
			}
		}
		Some(Glyph {
			width,
			height: self.height,
			mask,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixed_font() -> Vec<u8> {
		// 3x2 glyphs for 'A' and 'B'
		vec![3, 2, b'A', 2, 0b1010_0000, 0b0100_0000, 0b1110_0000, 0b0010_0000]
	}

	#[test]
	fn test_fixed_font() {
		let font = Font::from_bytes(&fixed_font()).unwrap();
		assert!(!font.is_proportional());
		assert_eq!(font.height(), 2);
		assert_eq!(font.char_width(b'B'), Some(3));
		assert_eq!(font.char_width(b'C'), None);
		assert_eq!(font.char_width(b'@'), None);
		assert_eq!(font.text_width(b"ABZ"), 6);

		let a = font.glyph(b'A').unwrap();
		assert_eq!(a.mask, vec![true, false, true, false, true, false]);
		let b = font.glyph(b'B').unwrap();
		assert!(b.is_set(2, 1));
		assert!(!b.is_set(0, 1));
		assert!(!b.is_set(3, 0));
	}

	#[test]
	fn test_fixed_font_truncated() {
		let data = fixed_font();
		assert!(matches!(
			Font::from_bytes(&data[..6]),
			Err(DgdsError::InsufficientData {
				file_type: FileType::Font,
				..
			})
		));
		assert!(Font::from_bytes(&[]).is_err());
	}

	fn proportional_font(method: Compression) -> Vec<u8> {
		// glyph '0' is 2 wide, glyph '1' is 10 wide, both 2 rows high
		let mut block = vec![0, 0, 2, 0, 2, 10];
		block.extend_from_slice(&[0b1000_0000, 0b0100_0000]);
		block.extend_from_slice(&[0xFF, 0b1100_0000, 0x00, 0b0100_0000]);

		let packed = codec::compress(method, &block);
		let mut data = vec![0xFF, 10, 2, 0, b'0', 2];
		data.extend_from_slice(&(block.len() as u16).to_le_bytes());
		data.push(method.into());
		data.extend_from_slice(&(block.len() as u32).to_le_bytes());
		data.extend_from_slice(&packed);
		data
	}

	#[test]
	fn test_proportional_font() {
		for method in [Compression::None, Compression::Rle, Compression::Lzw] {
			let font = Font::from_bytes(&proportional_font(method)).unwrap();
			assert!(font.is_proportional());
			assert_eq!(font.char_width(b'0'), Some(2));
			assert_eq!(font.char_width(b'1'), Some(10));
			assert_eq!(font.text_width(b"01"), 12);

			let zero = font.glyph(b'0').unwrap();
			assert_eq!(zero.mask, vec![true, false, false, true]);
			let one = font.glyph(b'1').unwrap();
			assert_eq!(one.mask.iter().filter(|&&set| set).count(), 11);
			assert!(one.is_set(9, 0));
			assert!(!one.is_set(8, 1));
			assert!(one.is_set(9, 1));
		}
	}

	#[test]
	fn test_proportional_bad_method() {
		let mut data = proportional_font(Compression::None);
		data[8] = 7;
		assert!(matches!(
			Font::from_bytes(&data),
			Err(DgdsError::UnsupportedCompression {
				method: 7,
				..
			})
		));
	}
}
