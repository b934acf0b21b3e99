//! VGA palettes.
//!
//! A `PAL` file holds one `VGA` chunk of 256 RGB triples with 6-bit channels;
//! channels are shifted left by two to reach the 8-bit range.

use std::fmt;
use std::ops::Index;

use crate::file::{DgdsError, FileType};

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
}

impl Color {
	/// Creates a color from 8-bit components.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r,
			g,
			b,
		}
	}

	/// Creates a color from 6-bit VGA DAC components.
	pub const fn from_vga(r: u8, g: u8, b: u8) -> Self {
		Self::new(r << 2, g << 2, b << 2)
	}

	/// Returns the color as a `0x00RRGGBB` value.
	pub const fn to_rgb24(&self) -> u32 {
		((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:06X}", self.to_rgb24())
	}
}

/// Number of palette entries.
pub const PALETTE_SIZE: usize = 256;

/// A 256-color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	colors: [Color; PALETTE_SIZE],
}

impl Default for Palette {
	fn default() -> Self {
		Self::black()
	}
}

impl Palette {
	/// Number of colors.
	pub const SIZE: usize = PALETTE_SIZE;

	/// Size of the `VGA` chunk payload.
	pub const VGA_BYTES: usize = Self::SIZE * 3;

	/// An all-black palette.
	pub fn black() -> Self {
		Self {
			colors: [Color::default(); Self::SIZE],
		}
	}

	/// Decodes a `VGA` chunk payload of 6-bit RGB triples.
	pub fn from_vga_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		if data.len() < Self::VGA_BYTES {
			return Err(DgdsError::insufficient_data(FileType::Palette, Self::VGA_BYTES, data.len()));
		}
		let mut palette = Self::black();
		for (color, rgb) in palette.colors.iter_mut().zip(data.chunks_exact(3)) {
			*color = Color::from_vga(rgb[0], rgb[1], rgb[2]);
		}
		Ok(palette)
	}

	/// All colors in index order.
	pub fn colors(&self) -> &[Color; PALETTE_SIZE] {
		&self.colors
	}

	/// Replaces one color.
	pub fn set(&mut self, index: u8, color: Color) {
		self.colors[usize::from(index)] = color;
	}

	/// Flattens the palette into `r, g, b` bytes.
	pub fn to_rgb_bytes(&self) -> Vec<u8> {
		self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
	}
}

impl Index<u8> for Palette {
	type Output = Color;

	fn index(&self, index: u8) -> &Self::Output {
		&self.colors[usize::from(index)]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_six_bit_channels_are_scaled() {
		let mut data = vec![0u8; Palette::VGA_BYTES];
		data[3..6].copy_from_slice(&[63, 32, 1]);
		let palette = Palette::from_vga_bytes(&data).unwrap();
		assert_eq!(palette[1], Color::new(252, 128, 4));
		assert_eq!(palette[0], Color::default());
		assert_eq!(palette.to_rgb_bytes().len(), Palette::VGA_BYTES);
	}

	#[test]
	fn test_short_palette() {
		assert!(matches!(
			Palette::from_vga_bytes(&[0; 12]),
			Err(DgdsError::InsufficientData {
				file_type: FileType::Palette,
				expected: 768,
				actual: 12,
			})
		));
	}

	#[test]
	fn test_color_display() {
		assert_eq!(Color::new(0x12, 0xAB, 0x00).to_string(), "#12AB00");
	}
}
