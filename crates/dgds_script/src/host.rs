//! Sinks that receive decoded frames, palettes and music.

use std::thread;
use std::time::Duration;

use dgds_types::file::Palette;

use crate::surface::Surface;

/// The display, audio and timing side of playback.
///
/// Every method has a default so a host only implements what it renders.
/// [`Host::wait`] sleeps by default.
pub trait Host {
	/// Applies a palette to the display.
	fn set_palette(&mut self, _palette: &Palette) {}

	/// Shows a composed frame.
	fn present(&mut self, _frame: &Surface) {}

	/// Starts a song, replacing the current one.
	fn play_music(&mut self, _song: &[u8]) {}

	/// Stops the current song.
	fn stop_music(&mut self) {}

	/// Polled once per frame; returning `true` stops playback.
	fn should_quit(&mut self) -> bool {
		false
	}

	/// Blocks between frames.
	fn wait(&mut self, duration: Duration) {
		thread::sleep(duration);
	}
}

/// A host that discards everything and never sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {
	fn wait(&mut self, _duration: Duration) {}
}
