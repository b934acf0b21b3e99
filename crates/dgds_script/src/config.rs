//! Playback configuration.
//!
//! [`PlaybackConfig`] gathers the knobs a host needs before it starts a script:
//! the target platform, frame pacing, interpreter bounds and additions to the
//! built-in profile table.
//!
//! # Presets
//!
//! - `default()`: paced playback at 40 ms per frame, no frame limit
//! - `headless()`: no pacing and a frame limit, for tests and batch tools
//!
//! # Examples
//!
//! ```
//! use dgds_script::config::PlaybackConfig;
//!
//! let config = PlaybackConfig::from_toml_str(
//! 	r#"
//! 	platform = "amiga"
//! 	frame_delay_ms = 20
//!
//! 	[profiles]
//! 	flat = ["INS"]
//! 	"#,
//! )
//! .unwrap();
//! assert_eq!(config.frame_delay_ms, 20);
//! assert_eq!(config.max_steps, PlaybackConfig::default().max_steps);
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use dgds_types::file::{Archive, Platform, ProfileOverrides, ProfileTable, ResourceLoader};

use crate::error::ScriptError;
use crate::interpreter::DEFAULT_MAX_STEPS;

/// Environment variable prefix for overrides (`DGDS_FRAME_DELAY_MS=0`).
pub const ENV_PREFIX: &str = "DGDS";

/// Milliseconds between frames before script delays are added.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 40;

/// Settings for a playback session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
	/// Platform the resources were built for
	pub platform: Platform,
	/// Base delay between frames, in milliseconds
	pub frame_delay_ms: u64,
	/// Instructions executed per frame before the interpreter yields
	pub max_steps: usize,
	/// Stop after this many frames
	pub max_frames: Option<usize>,
	/// Additions to the built-in profile table
	pub profiles: ProfileOverrides,
}

impl Default for PlaybackConfig {
	fn default() -> Self {
		Self {
			platform: Platform::Dos,
			frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
			max_steps: DEFAULT_MAX_STEPS,
			max_frames: None,
			profiles: ProfileOverrides::default(),
		}
	}
}

impl PlaybackConfig {
	/// Unpaced playback capped at `max_frames` frames.
	pub fn headless(max_frames: usize) -> Self {
		Self {
			frame_delay_ms: 0,
			max_frames: Some(max_frames),
			..Self::default()
		}
	}

	/// Reads a configuration file, then applies `DGDS_*` environment overrides.
	///
	/// The file is read as TOML whatever its extension. Nested environment keys use
	/// a double underscore: `DGDS_PROFILES__FLAT`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
		let config = Config::builder()
			.add_source(File::from(path.as_ref()).format(FileFormat::Toml))
			.add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
			.build()?;
		Ok(config.try_deserialize()?)
	}

	/// Parses a TOML document; missing keys keep their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, ScriptError> {
		let config = Config::builder().add_source(File::from_str(text, FileFormat::Toml)).build()?;
		Ok(config.try_deserialize()?)
	}

	/// Base delay between frames.
	pub fn frame_delay(&self) -> Duration {
		Duration::from_millis(self.frame_delay_ms)
	}

	/// The built-in profile table with the configured overrides applied.
	pub fn profile_table(&self) -> Result<ProfileTable, ScriptError> {
		let mut table = ProfileTable::builtin();
		table.apply(&self.profiles)?;
		Ok(table)
	}

	/// Wraps `archive` in a loader using this platform and profile table.
	pub fn loader(&self, archive: Archive) -> Result<ResourceLoader, ScriptError> {
		Ok(ResourceLoader::new(archive).with_profiles(self.profile_table()?).with_platform(self.platform))
	}
}

#[cfg(test)]
mod tests {
	use dgds_types::file::{ChunkTag, Extension};

	use super::*;

	#[test]
	fn test_presets() {
		let config = PlaybackConfig::default();
		assert_eq!(config.frame_delay(), Duration::from_millis(40));
		assert_eq!(config.max_frames, None);

		let headless = PlaybackConfig::headless(12);
		assert_eq!(headless.frame_delay(), Duration::ZERO);
		assert_eq!(headless.max_frames, Some(12));
		assert_eq!(headless.max_steps, config.max_steps);
	}

	#[test]
	fn test_toml_with_profiles() {
		let config = PlaybackConfig::from_toml_str(
			r#"
			platform = "amiga"
			max_frames = 3

			[profiles]
			flat = ["SNG"]

			[profiles.packed]
			PAL = ["VGA"]
			"#,
		)
		.unwrap();
		assert_eq!(config.platform, Platform::Amiga);
		assert_eq!(config.max_frames, Some(3));
		assert_eq!(config.frame_delay_ms, DEFAULT_FRAME_DELAY_MS);

		let table = config.profile_table().unwrap();
		let pal: Extension = "PAL".parse().unwrap();
		let sng: Extension = "SNG".parse().unwrap();
		assert!(table.is_packed(pal, ChunkTag::VGA));
		assert!(table.is_flat(sng, Platform::Dos));
	}

	#[test]
	fn test_bad_profile_override() {
		let config = PlaybackConfig::from_toml_str("[profiles]\nflat = [\"TOOLONG\"]").unwrap();
		assert!(matches!(config.profile_table(), Err(ScriptError::Resource(_))));
	}

	#[test]
	fn test_malformed_toml() {
		assert!(matches!(PlaybackConfig::from_toml_str("frame_delay_ms = \"soon\""), Err(ScriptError::Config(_))));
	}

	#[test]
	fn test_load_file() {
		let dir = std::env::temp_dir().join(format!("dgds-config-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("playback.toml");
		std::fs::write(&path, "max_steps = 64\n").unwrap();

		let config = PlaybackConfig::load(&path).unwrap();
		assert_eq!(config.max_steps, 64);

		let path = dir.join("PLAYBACK.CFG");
		std::fs::write(&path, "frame_delay_ms = 15
").unwrap();
		let config = PlaybackConfig::load(&path).unwrap();
		assert_eq!(config.frame_delay(), Duration::from_millis(15));
		std::fs::remove_dir_all(&dir).unwrap();
	}
}
