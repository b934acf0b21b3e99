//! 8bpp frame buffers and the rectangles that clip drawing into them.

use dgds_types::file::Bitmap;
use dgds_types::file::resource::bitmap::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// A half-open rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
	/// Leftmost column
	pub left: i32,
	/// Top row
	pub top: i32,
	/// One past the rightmost column
	pub right: i32,
	/// One past the bottom row
	pub bottom: i32,
}

impl Rect {
	/// Rectangle spanning two corners.
	pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
		Self {
			left,
			top,
			right,
			bottom,
		}
	}

	/// Rectangle from an origin and a size.
	pub fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
		Self::new(x, y, x + width, y + height)
	}

	/// The whole screen.
	pub fn screen() -> Self {
		Self::new(0, 0, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32)
	}

	/// Width, zero when inverted.
	pub fn width(&self) -> i32 {
		(self.right - self.left).max(0)
	}

	/// Height, zero when inverted.
	pub fn height(&self) -> i32 {
		(self.bottom - self.top).max(0)
	}

	/// Whether the rectangle covers no pixels.
	pub fn is_empty(&self) -> bool {
		self.width() == 0 || self.height() == 0
	}

	/// Overlap of two rectangles.
	pub fn intersect(&self, other: &Rect) -> Rect {
		Rect::new(
			self.left.max(other.left),
			self.top.max(other.top),
			self.right.min(other.right),
			self.bottom.min(other.bottom),
		)
	}
}

/// An indexed-colour pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
	width: usize,
	height: usize,
	pixels: Vec<u8>,
}

impl Default for Surface {
	fn default() -> Self {
		Self::screen()
	}
}

impl Surface {
	/// A cleared buffer of the given size.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			pixels: vec![0; width * height],
		}
	}

	/// A cleared 320×200 buffer.
	pub fn screen() -> Self {
		Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
	}

	/// Width in pixels.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Height in pixels.
	pub fn height(&self) -> usize {
		self.height
	}

	/// Row-major pixels.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Pixel at `(x, y)`, if inside the buffer.
	pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
		if x >= self.width {
			return None;
		}
		self.pixels.get(y * self.width + x).copied()
	}

	/// Whether every pixel is 0.
	pub fn is_clear(&self) -> bool {
		self.pixels.iter().all(|&p| p == 0)
	}

	fn bounds(&self) -> Rect {
		Rect::new(0, 0, self.width as i32, self.height as i32)
	}

	/// Rows of `area` clipped to the buffer, as `(row start index, column range)`.
	fn spans(&self, area: Rect) -> impl Iterator<Item = (usize, std::ops::Range<usize>)> + '_ {
		let area = area.intersect(&self.bounds());
		let columns = area.left.max(0) as usize..area.right.max(area.left).max(0) as usize;
		(area.top.max(0)..area.bottom.max(area.top)).map(move |y| (y as usize * self.width, columns.clone()))
	}

	/// Sets every pixel to `color`.
	pub fn fill(&mut self, color: u8) {
		self.pixels.fill(color);
	}

	/// Sets every pixel inside `area` to `color`.
	pub fn fill_rect(&mut self, area: Rect, color: u8) {
		let spans: Vec<_> = self.spans(area).collect();
		for (row, columns) in spans {
			self.pixels[row + columns.start..row + columns.end].fill(color);
		}
	}

	/// Replaces the contents with a same-sized buffer.
	pub fn copy_from(&mut self, other: &Surface) {
		self.pixels.copy_from_slice(&other.pixels);
	}

	/// Copies `area` from `other`, overwriting everything.
	pub fn copy_rect(&mut self, other: &Surface, area: Rect) {
		let spans: Vec<_> = self.spans(area.intersect(&other.bounds())).collect();
		for (row, columns) in spans {
			let range = row + columns.start..row + columns.end;
			self.pixels[range.clone()].copy_from_slice(&other.pixels[range]);
		}
	}

	/// Copies the non-zero pixels of `area` from `other`.
	pub fn blit_transparent(&mut self, other: &Surface, area: Rect) {
		let spans: Vec<_> = self.spans(area.intersect(&other.bounds())).collect();
		for (row, columns) in spans {
			for x in columns {
				let pixel = other.pixels[row + x];
				if pixel != 0 {
					self.pixels[row + x] = pixel;
				}
			}
		}
	}

	/// Draws `bitmap` with its top-left corner at `(x, y)`, skipping index 0 and
	/// everything outside `clip`.
	pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: i32, y: i32, clip: Rect) {
		let dest = Rect::with_size(x, y, i32::from(bitmap.width()), i32::from(bitmap.height()));
		let visible = dest.intersect(&clip).intersect(&self.bounds());
		if visible.is_empty() {
			return;
		}
		let src_width = usize::from(bitmap.width());
		let src = bitmap.pixels();
		for dy in visible.top..visible.bottom {
			let src_row = (dy - y) as usize * src_width;
			let dst_row = dy as usize * self.width;
			for dx in visible.left..visible.right {
				let pixel = src[src_row + (dx - x) as usize];
				if pixel != 0 {
					self.pixels[dst_row + dx as usize] = pixel;
				}
			}
		}
	}

	/// Copies a full-screen image, clipping if sizes differ.
	pub fn load_image(&mut self, image: &Bitmap) {
		self.fill(0);
		let width = usize::from(image.width()).min(self.width);
		for (y, row) in image.pixels().chunks(usize::from(image.width()).max(1)).take(self.height).enumerate() {
			self.pixels[y * self.width..y * self.width + width].copy_from_slice(&row[..width]);
		}
	}
}
