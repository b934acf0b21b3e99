//! Tiled bitmaps and full-screen images.
//!
//! Images are stored as two 4-bit planes: `BIN` holds the low nibble of each pixel
//! and `VGA` the high nibble, two pixels per byte. A `BMP` file adds an `INF` tile
//! table giving each tile's size; tiles are laid out back to back, so a tile's plane
//! data starts at half the pixel count of the tiles before it. An optional `MTX`
//! chunk arranges tiles into a grid.

use std::ops::Range;

use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

/// Screen width in pixels.
pub const SCREEN_WIDTH: usize = 320;

/// Screen height in pixels.
pub const SCREEN_HEIGHT: usize = 200;

/// Bytes in one 4-bit full-screen plane.
pub const SCREEN_PLANE_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT / 2;

/// Recombines a low-nibble (`BIN`) and high-nibble (`VGA`) plane into 8bpp pixels.
///
/// Each plane byte yields two pixels. The output covers the shorter plane.
pub fn interleave_planes(bin: &[u8], vga: &[u8]) -> Vec<u8> {
	let mut pixels = Vec::with_capacity(bin.len().min(vga.len()) * 2);
	for (&lo, &hi) in bin.iter().zip(vga) {
		pixels.push((hi & 0xF0) | ((lo & 0xF0) >> 4));
		pixels.push(((hi & 0x0F) << 4) | (lo & 0x0F));
	}
	pixels
}

/// An 8bpp indexed image; index 0 is transparent when drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
	width: u16,
	height: u16,
	pixels: Vec<u8>,
}

impl Bitmap {
	/// Wraps pixel data, which must hold exactly `width * height` bytes.
	pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self, DgdsError> {
		let expected = usize::from(width) * usize::from(height);
		if pixels.len() != expected {
			return Err(DgdsError::insufficient_data(FileType::Bitmap, expected, pixels.len()));
		}
		Ok(Self {
			width,
			height,
			pixels,
		})
	}

	/// A fully transparent image.
	pub fn blank(width: u16, height: u16) -> Self {
		Self {
			width,
			height,
			pixels: vec![0; usize::from(width) * usize::from(height)],
		}
	}

	/// Width in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Height in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Row-major pixel indices.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Pixel at `(x, y)`, if inside the image.
	pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
		if x >= usize::from(self.width) {
			return None;
		}
		self.pixels.get(y * usize::from(self.width) + x).copied()
	}

	/// Whether the image has no pixels.
	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}

	/// Decodes a 320×200 image from two 4-bit planes.
	pub fn screen_from_planes(bin: &[u8], vga: &[u8]) -> Result<Self, DgdsError> {
		for plane in [bin, vga] {
			if plane.len() < SCREEN_PLANE_SIZE {
				return Err(DgdsError::insufficient_data(FileType::Screen, SCREEN_PLANE_SIZE, plane.len()));
			}
		}
		let pixels = interleave_planes(&bin[..SCREEN_PLANE_SIZE], &vga[..SCREEN_PLANE_SIZE]);
		Self::new(SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16, pixels)
	}

	/// Decodes a 320×200 image stored at 8bpp.
	pub fn screen_from_ma8(data: &[u8]) -> Result<Self, DgdsError> {
		let size = SCREEN_WIDTH * SCREEN_HEIGHT;
		if data.len() < size {
			return Err(DgdsError::insufficient_data(FileType::Screen, size, data.len()));
		}
		Self::new(SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16, data[..size].to_vec())
	}
}

/// Size and plane position of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
	/// Width in pixels
	pub width: u16,
	/// Height in pixels
	pub height: u16,
	/// Pixel offset of the tile within the planes
	pub offset: u32,
}

impl TileInfo {
	/// Number of pixels in the tile.
	pub fn pixel_count(&self) -> usize {
		usize::from(self.width) * usize::from(self.height)
	}

	/// Byte range of the tile inside each 4-bit plane.
	pub fn plane_range(&self) -> Range<usize> {
		let start = (self.offset >> 1) as usize;
		start..start + self.pixel_count().div_ceil(2)
	}
}

/// The `INF` tile table of a bitmap file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTable {
	tiles: Vec<TileInfo>,
}

impl TileTable {
	/// Parses `u16 count`, `count` widths, then `count` heights.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Bitmap);
		let count = usize::from(reader.read_u16_le()?);
		let widths = (0..count).map(|_| reader.read_u16_le()).collect::<Result<Vec<_>, _>>()?;
		let heights = (0..count).map(|_| reader.read_u16_le()).collect::<Result<Vec<_>, _>>()?;

		let mut offset = 0u32;
		let tiles = widths
			.into_iter()
			.zip(heights)
			.map(|(width, height)| {
				let tile = TileInfo {
					width,
					height,
					offset,
				};
				offset = offset.wrapping_add(tile.pixel_count() as u32);
				tile
			})
			.collect();
		Ok(Self {
			tiles,
		})
	}

	/// Every tile, in index order.
	pub fn tiles(&self) -> &[TileInfo] {
		&self.tiles
	}

	/// Tile at `index`.
	pub fn get(&self, index: usize) -> Option<&TileInfo> {
		self.tiles.get(index)
	}

	/// Number of tiles.
	pub fn len(&self) -> usize {
		self.tiles.len()
	}

	/// Whether the table lists no tiles.
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}

	/// Bytes each plane must hold to cover every tile.
	pub fn plane_size(&self) -> usize {
		let pixels: usize = self.tiles.iter().map(TileInfo::pixel_count).sum();
		pixels.div_ceil(2)
	}
}

/// The `MTX` grid of tile indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMatrix {
	width: u16,
	height: u16,
	tiles: Vec<u16>,
}

impl TileMatrix {
	/// Parses `u16 width`, `u16 height`, then `width * height` tile indices.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Bitmap);
		let width = reader.read_u16_le()?;
		let height = reader.read_u16_le()?;
		let count = usize::from(width) * usize::from(height);
		let tiles = (0..count).map(|_| reader.read_u16_le()).collect::<Result<_, _>>()?;
		Ok(Self {
			width,
			height,
			tiles,
		})
	}

	/// Columns in the grid.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Rows in the grid.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Tile index at grid position `(x, y)`.
	pub fn get(&self, x: u16, y: u16) -> Option<u16> {
		if x >= self.width {
			return None;
		}
		self.tiles.get(usize::from(y) * usize::from(self.width) + usize::from(x)).copied()
	}
}

/// A decoded bitmap file: tile table, both planes and the optional grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitmapSet {
	/// Tile sizes and offsets
	pub table: TileTable,
	/// Low-nibble plane
	pub bin: Vec<u8>,
	/// High-nibble plane
	pub vga: Vec<u8>,
	/// Tile grid, if the file has one
	pub matrix: Option<TileMatrix>,
}

impl BitmapSet {
	/// Number of tiles.
	pub fn tile_count(&self) -> usize {
		self.table.len()
	}

	/// Decodes tile `index`, or `None` if there is no such tile.
	pub fn tile(&self, index: usize) -> Result<Option<Bitmap>, DgdsError> {
		let Some(info) = self.table.get(index) else {
			return Ok(None);
		};
		let range = info.plane_range();
		let bin = plane_slice(&self.bin, &range)?;
		let vga = plane_slice(&self.vga, &range)?;
		let mut pixels = interleave_planes(bin, vga);
		pixels.truncate(info.pixel_count());
		Bitmap::new(info.width, info.height, pixels).map(Some)
	}
}

fn plane_slice<'a>(plane: &'a [u8], range: &Range<usize>) -> Result<&'a [u8], DgdsError> {
	plane
		.get(range.clone())
		.ok_or_else(|| DgdsError::insufficient_data(FileType::Bitmap, range.end, plane.len()))
}
