//! State shared by every script of a playback session.

use dgds_types::file::{Bitmap, BitmapSet, Palette};

use crate::surface::{Rect, Surface};

/// Number of bitmap, screen and song slots.
pub const SLOT_COUNT: usize = 16;

/// Converts a script operand into a slot index.
pub fn slot_index(value: i16) -> Option<usize> {
	usize::try_from(value).ok().filter(|&index| index < SLOT_COUNT)
}

/// A bitmap file bound to a slot; decoded on first use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BitmapSlot {
	/// File name given by the load instruction
	pub name: Option<String>,
	/// Decoded tiles, once loaded
	pub set: Option<BitmapSet>,
}

/// Palette, frame buffers and resource selections mutated by the running script.
///
/// Drawing goes into `overlay`; `background` persists across frames; `frame` is
/// what the host is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
	/// Most recently loaded palette
	pub palette: Palette,
	/// Palette last handed to the host
	pub applied_palette: Palette,
	/// Persistent backdrop
	pub background: Surface,
	/// Per-frame drawing layer
	pub overlay: Surface,
	/// Composed output
	pub frame: Surface,
	/// Bitmap slots
	pub bitmaps: Vec<BitmapSlot>,
	/// Screen file names per slot
	pub screens: Vec<Option<String>>,
	/// Song file names per slot
	pub songs: Vec<Option<String>>,
	/// Selected bitmap slot
	pub bitmap_slot: usize,
	/// Selected screen slot
	pub screen_slot: usize,
	/// Selected song slot
	pub song_slot: usize,
	/// Selected tile of the selected bitmap
	pub tile: Option<u16>,
	/// Decoded selected tile
	pub current: Option<Bitmap>,
	/// Bitmap drawing is clipped to this window
	pub clip_window: Rect,
	/// Area of the overlay flushed on refresh
	pub bitmap_window: Rect,
}

impl Default for PlaybackContext {
	fn default() -> Self {
		Self::new()
	}
}

impl PlaybackContext {
	/// A cleared context with black palettes and empty slots.
	pub fn new() -> Self {
		Self {
			palette: Palette::black(),
			applied_palette: Palette::black(),
			background: Surface::screen(),
			overlay: Surface::screen(),
			frame: Surface::screen(),
			bitmaps: vec![BitmapSlot::default(); SLOT_COUNT],
			screens: vec![None; SLOT_COUNT],
			songs: vec![None; SLOT_COUNT],
			bitmap_slot: 0,
			screen_slot: 0,
			song_slot: 0,
			tile: None,
			current: None,
			clip_window: Rect::screen(),
			bitmap_window: Rect::screen(),
		}
	}

	/// Restores the state of [`PlaybackContext::new`].
	pub fn reset(&mut self) {
		*self = Self::new();
	}

	/// Sets `frame` to the background with the overlay's non-zero pixels in `area` on top.
	pub fn compose(&mut self, area: Rect) {
		self.frame.copy_from(&self.background);
		self.frame.blit_transparent(&self.overlay, area);
	}

	/// The selected bitmap slot.
	pub fn selected_bitmap(&self) -> &BitmapSlot {
		&self.bitmaps[self.bitmap_slot]
	}

	/// Drops every decoded bitmap; names stay bound.
	pub fn purge_images(&mut self) {
		for slot in &mut self.bitmaps {
			slot.set = None;
		}
		self.current = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_slot_index() {
		assert_eq!(slot_index(0), Some(0));
		assert_eq!(slot_index(15), Some(15));
		assert_eq!(slot_index(16), None);
		assert_eq!(slot_index(-1), None);
	}

	#[test]
	fn test_compose() {
		let mut context = PlaybackContext::new();
		context.background.fill(3);
		context.overlay.fill_rect(Rect::new(0, 0, 2, 1), 8);
		context.compose(Rect::new(1, 0, 320, 200));
		assert_eq!(context.frame.pixel(0, 0), Some(3));
		assert_eq!(context.frame.pixel(1, 0), Some(8));
		assert_eq!(context.frame.pixel(2, 0), Some(3));
	}
}
