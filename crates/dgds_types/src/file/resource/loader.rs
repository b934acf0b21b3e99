//! Archive-backed resource loading.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::file::DgdsError;
use crate::file::archive::Archive;
use crate::file::profile::{Platform, ProfileTable};

use super::{AdsData, Bitmap, BitmapSet, Font, Palette, ResourceFile, SongBank, SoundBank, TtmData};

/// Reads files from an [`Archive`] and decodes them into typed resources.
///
/// Every `load_*` method returns `Ok(None)` when the file is not in the archive and
/// an error when it is present but cannot be decoded.
#[derive(Debug)]
pub struct ResourceLoader {
	archive: Archive,
	profiles: ProfileTable,
	platform: Platform,
}

impl ResourceLoader {
	/// Creates a loader using the built-in profile table and the DOS platform.
	pub fn new(archive: Archive) -> Self {
		Self {
			archive,
			profiles: ProfileTable::builtin(),
			platform: Platform::Dos,
		}
	}

	/// Replaces the profile table.
	pub fn with_profiles(mut self, profiles: ProfileTable) -> Self {
		self.profiles = profiles;
		self
	}

	/// Sets the platform used to recognise flat files.
	pub fn with_platform(mut self, platform: Platform) -> Self {
		self.platform = platform;
		self
	}

	/// The underlying archive.
	pub fn archive(&self) -> &Archive {
		&self.archive
	}

	/// The active profile table.
	pub fn profiles(&self) -> &ProfileTable {
		&self.profiles
	}

	/// The active platform.
	pub fn platform(&self) -> Platform {
		self.platform
	}

	/// Reads the stored bytes of `name`.
	pub fn read_raw(&self, name: &str) -> Result<Option<Vec<u8>>, DgdsError> {
		let data = self.archive.read_file(name)?;
		if data.is_none() {
			warn!("{name}: not found");
		}
		Ok(data)
	}

	/// Reads and decodes every chunk of `name`.
	pub fn load(&self, name: &str) -> Result<Option<ResourceFile>, DgdsError> {
		let Some(data) = self.read_raw(name)? else {
			return Ok(None);
		};
		debug!("Loading {name} ({} bytes)", data.len());
		ResourceFile::parse(name, &data, &self.profiles, self.platform).map(Some)
	}

	fn load_with<T>(
		&self,
		name: &str,
		extract: impl FnOnce(&ResourceFile) -> Result<T, DgdsError>,
	) -> Result<Option<T>, DgdsError> {
		match self.load(name)? {
			Some(file) => extract(&file).map(Some),
			None => Ok(None),
		}
	}

	/// Loads a `PAL` file.
	pub fn load_palette(&self, name: &str) -> Result<Option<Palette>, DgdsError> {
		self.load_with(name, ResourceFile::palette)
	}

	/// Loads a `BMP` file.
	pub fn load_bitmaps(&self, name: &str) -> Result<Option<BitmapSet>, DgdsError> {
		self.load_with(name, ResourceFile::bitmap_set)
	}

	/// Loads a `SCR` file.
	pub fn load_screen(&self, name: &str) -> Result<Option<Bitmap>, DgdsError> {
		self.load_with(name, ResourceFile::screen)
	}

	/// Loads a `FNT` file.
	pub fn load_font(&self, name: &str) -> Result<Option<Font>, DgdsError> {
		self.load_with(name, ResourceFile::font)
	}

	/// Loads a `SNG` file.
	pub fn load_song(&self, name: &str) -> Result<Option<SongBank>, DgdsError> {
		self.load_with(name, ResourceFile::song_bank)
	}

	/// Loads an `SX` file.
	pub fn load_sounds(&self, name: &str) -> Result<Option<SoundBank>, DgdsError> {
		self.load_with(name, ResourceFile::sound_bank)
	}

	/// Loads a `TTM` file.
	pub fn load_scene_script(&self, name: &str) -> Result<Option<TtmData>, DgdsError> {
		self.load_with(name, ResourceFile::scene_script)
	}

	/// Loads an `ADS` file together with every scene script its `RES` table names.
	///
	/// Scenes missing from the archive are left out with a warning.
	pub fn load_sequence_script(&self, name: &str) -> Result<Option<AdsData>, DgdsError> {
		let Some(mut ads) = self.load_with(name, ResourceFile::sequence_script)? else {
			return Ok(None);
		};
		let mut scenes = BTreeMap::new();
		for (id, scene) in ads.resources.iter() {
			match self.load_scene_script(scene)? {
				Some(ttm) => {
					scenes.insert(id, ttm);
				}
				None => warn!("{name}: scene {id} ({scene}) is missing"),
			}
		}
		ads.scenes = scenes;
		Ok(Some(ads))
	}
}
