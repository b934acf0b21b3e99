//! Full playback runs against a recording host.

use std::time::Duration;

use dgds_rs::prelude::*;

use crate::fixtures;

#[derive(Debug, Default)]
struct RecordingHost {
	palettes: Vec<Palette>,
	frames: Vec<Surface>,
	slept: Duration,
}

impl Host for RecordingHost {
	fn set_palette(&mut self, palette: &Palette) {
		self.palettes.push(palette.clone());
	}

	fn present(&mut self, frame: &Surface) {
		self.frames.push(frame.clone());
	}

	fn wait(&mut self, duration: Duration) {
		self.slept += duration;
	}
}

fn player(config: PlaybackConfig) -> (tempfile::TempDir, Player<RecordingHost>) {
	let dir = tempfile::tempdir().unwrap();
	let index = fixtures::archive_builder().write_to(dir.path(), "RESOURCE.MAP").unwrap();
	let loader = config.loader(Archive::open(&index).unwrap()).unwrap();
	(dir, Player::new(loader, RecordingHost::default(), config))
}

#[test_log::test]
fn test_scene_walks_across_the_screen() {
	let (_dir, mut player) = player(PlaybackConfig::default());
	let report = player.play("WALK.TTM").unwrap();
	assert_eq!(
		report,
		PlaybackReport {
			frames: 5,
			completed: true,
		}
	);

	let host = player.into_host();
	assert_eq!(host.palettes.len(), 1);
	assert_eq!(host.palettes[0][1], Color::new(252, 0, 0));
	// the fade-in frame is blank, then one tile per frame
	assert!(host.frames[0].is_clear());
	for (step, frame) in host.frames[1..].iter().enumerate() {
		assert_eq!(frame.pixel(step * 10, 100), Some(1));
		assert_eq!(frame.pixel(step * 10 + 1, 101), Some(1));
		if step > 0 {
			assert_eq!(frame.pixel((step - 1) * 10, 100), Some(0));
		}
	}
	assert_eq!(host.slept, Duration::from_millis(5 * 40 + 4 * 10));
}

#[test_log::test]
fn test_sequence_runs_scene_in_two_parts() {
	let (_dir, mut player) = player(PlaybackConfig::headless(100));
	let report = player.play("intro.ads").unwrap();
	assert!(report.completed);
	// activation, fade-in, scene ids 1 and 2; activation, scene ids 3 and 4, finish
	assert_eq!(report.frames, 8);

	let frame = &player.context().frame;
	assert_eq!(frame.pixel(30, 100), Some(1));
	assert_eq!(frame.pixel(20, 100), Some(0));
}

#[test]
fn test_headless_frame_limit() {
	let (_dir, mut player) = player(PlaybackConfig::headless(2));
	let report = player.play("WALK.TTM").unwrap();
	assert!(!report.completed);
	assert_eq!(player.host().frames.len(), 2);
	assert_eq!(player.host().slept, Duration::from_millis(10));
}

#[test]
fn test_config_file_drives_playback() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("dgds.toml");
	std::fs::write(&path, "frame_delay_ms = 0\nmax_frames = 3\n").unwrap();
	let config = PlaybackConfig::load(&path).unwrap();

	let (_archive_dir, mut player) = player(config);
	let report = player.play("WALK.TTM").unwrap();
	assert_eq!(report.frames, 3);
	assert_eq!(player.host().slept, Duration::from_millis(20));
}
