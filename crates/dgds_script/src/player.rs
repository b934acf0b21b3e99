//! Frame-stepped playback loop.

use std::time::Duration;

use log::{debug, info};

use dgds_types::file::{Extension, ResourceLoader};

use crate::ads::AdsState;
use crate::config::PlaybackConfig;
use crate::context::PlaybackContext;
use crate::error::ScriptError;
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::ttm::TtmState;

/// Summary of one playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackReport {
	/// Frames presented to the host
	pub frames: usize,
	/// Whether the script ran to its end
	pub completed: bool,
}

/// Runs scripts from an archive against a host, one frame at a time.
///
/// Each frame is one bounded interpreter run. After a run that yields, the
/// composed frame is presented and the host waits for the configured frame delay
/// plus whatever delay the script requested.
pub struct Player<H: Host> {
	loader: ResourceLoader,
	context: PlaybackContext,
	host: H,
	config: PlaybackConfig,
}

impl<H: Host> Player<H> {
	/// Creates a player with a fresh playback context.
	pub fn new(loader: ResourceLoader, host: H, config: PlaybackConfig) -> Self {
		Self {
			loader,
			context: PlaybackContext::new(),
			host,
			config,
		}
	}

	/// The resource loader.
	pub fn loader(&self) -> &ResourceLoader {
		&self.loader
	}

	/// Drawing state left behind by the last playback.
	pub fn context(&self) -> &PlaybackContext {
		&self.context
	}

	/// The host.
	pub fn host(&self) -> &H {
		&self.host
	}

	/// The host, mutably.
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	/// Playback settings.
	pub fn config(&self) -> &PlaybackConfig {
		&self.config
	}

	/// Consumes the player and returns the host.
	pub fn into_host(self) -> H {
		self.host
	}

	/// Plays a scene or sequence script, chosen by file extension.
	pub fn play(&mut self, name: &str) -> Result<PlaybackReport, ScriptError> {
		match Extension::from_filename(name) {
			Some(Extension::TTM) => self.play_scene(name),
			Some(Extension::ADS | Extension::ADL | Extension::ADH) => self.play_sequence(name),
			_ => Err(ScriptError::NotAScript {
				name: name.to_string(),
			}),
		}
	}

	/// Plays a scene script from the start.
	pub fn play_scene(&mut self, name: &str) -> Result<PlaybackReport, ScriptError> {
		let ttm = self.loader.load_scene_script(name)?.ok_or_else(|| ScriptError::NotFound {
			name: name.to_string(),
		})?;
		info!("playing scene script {} ({} bytes)", ttm.name, ttm.code.len());

		let mut state = TtmState::new();
		Ok(self.drive(&ttm.name, |interpreter| {
			let running = interpreter.run_scene(&ttm, &mut state);
			(running, state.take_delay())
		}))
	}

	/// Plays a sequence script and the scene scripts it references.
	pub fn play_sequence(&mut self, name: &str) -> Result<PlaybackReport, ScriptError> {
		let ads = self.loader.load_sequence_script(name)?.ok_or_else(|| ScriptError::NotFound {
			name: name.to_string(),
		})?;
		info!("playing sequence script {} with {} scenes", ads.name, ads.scenes.len());

		let mut state = AdsState::new();
		Ok(self.drive(&ads.name, |interpreter| {
			let running = interpreter.run_sequence(&ads, &mut state);
			(running, state.take_delay())
		}))
	}

	fn drive<F>(&mut self, name: &str, mut run: F) -> PlaybackReport
	where
		F: FnMut(&mut Interpreter<'_>) -> (bool, Duration),
	{
		self.context.reset();
		let mut report = PlaybackReport::default();
		loop {
			if self.host.should_quit() {
				info!("{name}: stopped by host after {} frames", report.frames);
				break;
			}
			if let Some(max_frames) = self.config.max_frames
				&& report.frames >= max_frames
			{
				debug!("{name}: frame limit {max_frames} reached");
				break;
			}

			let (running, delay) = {
				let mut interpreter =
					Interpreter::new(&mut self.context, &self.loader, &mut self.host).with_max_steps(self.config.max_steps);
				run(&mut interpreter)
			};
			if !running {
				report.completed = true;
				break;
			}

			report.frames += 1;
			self.host.present(&self.context.frame);
			self.host.wait(self.config.frame_delay() + delay);
		}
		if report.completed {
			self.host.stop_music();
		}
		debug!("{name}: {} frames, completed: {}", report.frames, report.completed);
		report
	}
}

#[cfg(test)]
mod tests {
	use dgds_types::file::chunk::ChunkBuilder;
	use dgds_types::file::codec::Compression;
	use dgds_types::file::{ArchiveBuilder, ChunkTag, StringTable};

	use super::*;
	use crate::surface::Surface;
	use crate::ttm::opcode::code;
	use crate::ttm::{Instruction, Operands};

	#[derive(Debug, Default)]
	struct CountingHost {
		frames: Vec<u8>,
		waits: Vec<Duration>,
		stopped: bool,
		quit_after: Option<usize>,
	}

	impl Host for CountingHost {
		fn present(&mut self, frame: &Surface) {
			self.frames.push(frame.pixel(0, 0).unwrap_or_default());
		}

		fn stop_music(&mut self) {
			self.stopped = true;
		}

		fn should_quit(&mut self) -> bool {
			self.quit_after.is_some_and(|n| self.frames.len() >= n)
		}

		fn wait(&mut self, duration: Duration) {
			self.waits.push(duration);
		}
	}

	fn ints(opcode: u16, values: &[i16]) -> Vec<u8> {
		Instruction {
			offset: 0,
			opcode,
			operands: Operands::Ints(values.to_vec()),
		}
		.to_bytes()
	}

	fn scene_file(code: &[u8]) -> Vec<u8> {
		ChunkBuilder::new()
			.leaf(ChunkTag::VER, b"4.09\0")
			.packed_leaf(ChunkTag::TT3, Compression::Rle, code)
			.build()
	}

	fn sequence_file(code: &[u8]) -> Vec<u8> {
		let mut res = StringTable::default();
		res.insert(1, "INTRO.TTM");
		ChunkBuilder::new()
			.leaf(ChunkTag::VER, b"4.09\0")
			.leaf(ChunkTag::RES, &res.to_bytes())
			.packed_leaf(ChunkTag::SCR, Compression::Lzw, code)
			.build()
	}

	fn player(quit_after: Option<usize>, config: PlaybackConfig) -> Player<CountingHost> {
		let intro = [
			ints(code::SET_DELAY, &[2]),
			ints(code::REFRESH, &[]),
			ints(code::SET_SCENE, &[1]),
			ints(code::REFRESH, &[]),
			ints(code::SET_SCENE, &[2]),
			ints(code::REFRESH, &[]),
			ints(code::FINISH, &[]),
		]
		.concat();
		let archive = ArchiveBuilder::new([1, 2, 3, 4])
			.file("INTRO.TTM", scene_file(&intro))
			.file("MAIN.ADS", sequence_file(&[0x05, 0x20, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF]))
			.file("GAME.PAL", Vec::new())
			.build_archive();
		let host = CountingHost {
			quit_after,
			..CountingHost::default()
		};
		Player::new(config.loader(archive).unwrap(), host, config)
	}

	#[test_log::test]
	fn test_scene_playback() {
		let mut player = player(None, PlaybackConfig::default());
		let report = player.play("intro.ttm").unwrap();
		assert_eq!(
			report,
			PlaybackReport {
				frames: 3,
				completed: true,
			}
		);
		let host = player.into_host();
		assert_eq!(host.frames.len(), 3);
		assert_eq!(
			host.waits,
			[Duration::from_millis(60), Duration::from_millis(40), Duration::from_millis(40)]
		);
		assert!(host.stopped);
	}

	#[test_log::test]
	fn test_sequence_playback() {
		let mut player = player(None, PlaybackConfig::headless(100));
		let report = player.play("MAIN.ADS").unwrap();
		// activation frame, then scene ids 0, 1, 2
		assert_eq!(report.frames, 4);
		assert!(report.completed);
		assert_eq!(player.host().waits[1], Duration::from_millis(20));
	}

	#[test]
	fn test_frame_limit_and_quit() {
		let mut player = player(None, PlaybackConfig::headless(2));
		let report = player.play_scene("INTRO.TTM").unwrap();
		assert_eq!(
			report,
			PlaybackReport {
				frames: 2,
				completed: false,
			}
		);
		assert!(!player.host().stopped);

		let mut player = self::player(Some(1), PlaybackConfig::headless(10));
		let report = player.play_scene("INTRO.TTM").unwrap();
		assert_eq!(report.frames, 1);
		assert!(!report.completed);
	}

	#[test_log::test]
	fn test_missing_and_wrong_kind() {
		let mut player = player(None, PlaybackConfig::headless(10));
		assert!(matches!(
			player.play("NOSUCH.TTM"),
			Err(ScriptError::NotFound { name }) if name == "NOSUCH.TTM"
		));
		assert!(matches!(player.play("GAME.PAL"), Err(ScriptError::NotAScript { .. })));
		assert!(matches!(player.play("README"), Err(ScriptError::NotAScript { .. })));
	}
}
