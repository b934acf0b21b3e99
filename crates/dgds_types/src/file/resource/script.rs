//! Scene (`TTM`) and sequence (`ADS`) script files.
//!
//! Both file kinds carry a `VER` string, their bytecode and a `TAG` table naming
//! scenes. A sequence file adds a `RES` table mapping resource ids to the scene
//! script files it drives; the loader resolves those into [`TtmData`] up front.

use std::collections::BTreeMap;

use super::strings::StringTable;

/// An immutable scene script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TtmData {
	/// File name the script was loaded from
	pub name: String,
	/// Contents of the `VER` chunk
	pub version: String,
	/// Contents of the `PAG` chunk
	pub pages: u16,
	/// Bytecode from the `TT3` chunk
	pub code: Vec<u8>,
	/// Scene names from the `TAG` chunk
	pub tags: StringTable,
}

impl TtmData {
	/// Wraps bare bytecode; mostly useful for tests and tools.
	pub fn from_code(name: impl Into<String>, code: Vec<u8>) -> Self {
		Self {
			name: name.into(),
			code,
			..Self::default()
		}
	}
}

/// An immutable sequence script with its scene scripts preloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdsData {
	/// File name the script was loaded from
	pub name: String,
	/// Contents of the `VER` chunk
	pub version: String,
	/// Resource id → scene script file name, from the `RES` chunk
	pub resources: StringTable,
	/// Bytecode from the `SCR` chunk
	pub code: Vec<u8>,
	/// Sequence names from the `TAG` chunk
	pub tags: StringTable,
	/// Scene scripts keyed by resource id
	pub scenes: BTreeMap<u16, TtmData>,
}

impl AdsData {
	/// Wraps bare bytecode and already loaded scenes.
	pub fn from_code(name: impl Into<String>, code: Vec<u8>, scenes: BTreeMap<u16, TtmData>) -> Self {
		Self {
			name: name.into(),
			code,
			scenes,
			..Self::default()
		}
	}

	/// Scene script registered under resource id `id`.
	pub fn scene(&self, id: u16) -> Option<&TtmData> {
		self.scenes.get(&id)
	}
}
