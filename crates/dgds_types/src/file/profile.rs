//! Per-extension chunk profiles.
//!
//! Whether a leaf chunk carries a compression prefix depends on the file extension
//! and the chunk tag, and whether a file has chunk framing at all depends on the
//! extension and the platform. Both associations live in a [`ProfileTable`];
//! anything the table does not list is treated as uncompressed and framed.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::file::{DgdsError, FileType};

/// Parses up to three ASCII letters or digits into an upper-case, NUL-padded code.
fn parse_code(text: &str) -> Option<[u8; 3]> {
	let bytes = text.as_bytes();
	if bytes.is_empty() || bytes.len() > 3 || !bytes.iter().all(u8::is_ascii_alphanumeric) {
		return None;
	}
	let mut code = [0u8; 3];
	for (dst, src) in code.iter_mut().zip(bytes) {
		*dst = src.to_ascii_uppercase();
	}
	Some(code)
}

fn code_str(code: &[u8; 3]) -> &str {
	let end = code.iter().position(|&b| b == 0).unwrap_or(3);
	std::str::from_utf8(&code[..end]).unwrap_or("???")
}

/// Three-character chunk tag, without the `:` terminator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkTag([u8; 3]);

impl ChunkTag {
	/// Version string
	pub const VER: Self = Self(*b"VER");
	/// Page count
	pub const PAG: Self = Self(*b"PAG");
	/// Scene script code
	pub const TT3: Self = Self(*b"TT3");
	/// Name table
	pub const TAG: Self = Self(*b"TAG");
	/// Resource (child script) table
	pub const RES: Self = Self(*b"RES");
	/// Script code or screen container
	pub const SCR: Self = Self(*b"SCR");
	/// Low-nibble plane
	pub const BIN: Self = Self(*b"BIN");
	/// High-nibble plane, or palette data inside PAL files
	pub const VGA: Self = Self(*b"VGA");
	/// 8bpp plane
	pub const MA8: Self = Self(*b"MA8");
	/// Tile table or info list
	pub const INF: Self = Self(*b"INF");
	/// Tile matrix
	pub const MTX: Self = Self(*b"MTX");
	/// Font data
	pub const FNT: Self = Self(*b"FNT");
	/// Song data
	pub const SNG: Self = Self(*b"SNG");
	/// Palette container
	pub const PAL: Self = Self(*b"PAL");
	/// Bitmap container
	pub const BMP: Self = Self(*b"BMP");
	/// File name table
	pub const FNM: Self = Self(*b"FNM");
	/// Raw data
	pub const DAT: Self = Self(*b"DAT");
	/// Request container
	pub const REQ: Self = Self(*b"REQ");
	/// Gadget table
	pub const GAD: Self = Self(*b"GAD");

	/// Creates a tag from raw bytes.
	pub const fn new(bytes: [u8; 3]) -> Self {
		Self(bytes)
	}

	/// The raw tag bytes.
	pub const fn as_bytes(&self) -> &[u8; 3] {
		&self.0
	}
}

impl FromStr for ChunkTag {
	type Err = DgdsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match parse_code(s) {
			Some(code) if s.len() == 3 => Ok(Self(code)),
			_ => Err(DgdsError::invalid_value(FileType::Chunk, format!("invalid chunk tag {s:?}"))),
		}
	}
}

impl fmt::Display for ChunkTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for &b in &self.0 {
			let c = if b.is_ascii_graphic() {
				b as char
			} else {
				'?'
			};
			write!(f, "{c}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for ChunkTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ChunkTag({self})")
	}
}

/// Upper-case file extension of up to three characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Extension([u8; 3]);

impl Extension {
	/// Sequence script
	pub const ADS: Self = Self(*b"ADS");
	/// Sequence script variant
	pub const ADL: Self = Self(*b"ADL");
	/// Sequence script variant
	pub const ADH: Self = Self(*b"ADH");
	/// Bitmap tiles
	pub const BMP: Self = Self(*b"BMP");
	/// Full-screen image
	pub const SCR: Self = Self(*b"SCR");
	/// Palette
	pub const PAL: Self = Self(*b"PAL");
	/// Font
	pub const FNT: Self = Self(*b"FNT");
	/// Song bank
	pub const SNG: Self = Self(*b"SNG");
	/// Sound bank
	pub const SX: Self = Self(*b"SX\0");
	/// Scene script
	pub const TTM: Self = Self(*b"TTM");
	/// Request (dialog layout)
	pub const REQ: Self = Self(*b"REQ");
	/// Game data
	pub const GDS: Self = Self(*b"GDS");
	/// Scene data
	pub const SDS: Self = Self(*b"SDS");
	/// Talk data
	pub const TDS: Self = Self(*b"TDS");
	/// Dialog data
	pub const DDS: Self = Self(*b"DDS");
	/// Overlay bundle
	pub const OVL: Self = Self(*b"OVL");
	/// Restart table
	pub const RST: Self = Self(*b"RST");
	/// Text list
	pub const VIN: Self = Self(*b"VIN");
	/// Opaque data
	pub const DAT: Self = Self(*b"DAT");
	/// Amiga instrument
	pub const INS: Self = Self(*b"INS");
	/// Amiga text list
	pub const AMG: Self = Self(*b"AMG");

	/// Takes the extension from a file name (text after the last `.`).
	pub fn from_filename(name: &str) -> Option<Self> {
		let (_, ext) = name.rsplit_once('.')?;
		ext.parse().ok()
	}

	/// The extension as text.
	pub fn as_str(&self) -> &str {
		code_str(&self.0)
	}
}

impl FromStr for Extension {
	type Err = DgdsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_code(s)
			.map(Self)
			.ok_or_else(|| DgdsError::invalid_value(FileType::Chunk, format!("invalid extension {s:?}")))
	}
}

impl fmt::Display for Extension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl fmt::Debug for Extension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Extension({self})")
	}
}

/// Platform a game release targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
	/// MS-DOS
	#[default]
	Dos,
	/// Commodore Amiga
	Amiga,
	/// Apple Macintosh
	Macintosh,
}

/// Additions to the built-in profile table, usually read from configuration.
///
/// `packed` replaces the compressed tag set of each listed extension; `flat` marks
/// extensions as unframed on every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
	/// Extension → compressed chunk tags
	pub packed: BTreeMap<String, Vec<String>>,
	/// Extensions without chunk framing
	pub flat: Vec<String>,
}

impl ProfileOverrides {
	/// Returns `true` if there is nothing to apply.
	pub fn is_empty(&self) -> bool {
		self.packed.is_empty() && self.flat.is_empty()
	}
}

/// Extension/tag compression associations and flat-file rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTable {
	packed: HashMap<Extension, BTreeSet<ChunkTag>>,
	flat: HashSet<(Extension, Option<Platform>)>,
}

impl Default for ProfileTable {
	fn default() -> Self {
		Self::builtin()
	}
}

impl ProfileTable {
	/// Creates a table with no associations at all.
	pub fn empty() -> Self {
		Self {
			packed: HashMap::new(),
			flat: HashSet::new(),
		}
	}

	/// The associations every known DGDS release uses.
	pub fn builtin() -> Self {
		const PACKED: &[(&str, &[&str])] = &[
			("ADS", &["SCR"]),
			("ADL", &["SCR"]),
			("ADH", &["SCR"]),
			("BMP", &["BIN", "VGA"]),
			("GDS", &["SDS"]),
			("SCR", &["BIN", "VGA", "MA8"]),
			("SDS", &["SDS"]),
			("SNG", &["SNG"]),
			("TTM", &["TT3"]),
			("TDS", &["THD", "TDS"]),
			("DDS", &["DDS"]),
			(
				"OVL",
				&[
					"ADL", "ADS", "APA", "ASB", "GMD", "M32", "NLD", "PRO", "PS1", "SBL", "SBP", "STD",
					"TAN", "T3V", "001", "003", "004", "101", "VGA",
				],
			),
		];
		const FLAT: &[(&str, Option<Platform>)] = &[
			("RST", None),
			("VIN", None),
			("DAT", None),
			("BMP", Some(Platform::Amiga)),
			("SCR", Some(Platform::Amiga)),
			("INS", Some(Platform::Amiga)),
			("AMG", Some(Platform::Amiga)),
		];

		let mut table = Self::empty();
		for (ext, tags) in PACKED {
			if let Some(ext) = parse_code(ext) {
				let tags = tags.iter().filter_map(|t| parse_code(t)).map(ChunkTag);
				table.packed.entry(Extension(ext)).or_default().extend(tags);
			}
		}
		for (ext, platform) in FLAT {
			if let Some(ext) = parse_code(ext) {
				table.flat.insert((Extension(ext), *platform));
			}
		}
		table
	}

	/// Marks `tag` as compressed inside files with extension `ext`.
	pub fn set_packed(&mut self, ext: Extension, tag: ChunkTag) {
		self.packed.entry(ext).or_default().insert(tag);
	}

	/// Marks `ext` as flat, either on every platform or only on `platform`.
	pub fn set_flat(&mut self, ext: Extension, platform: Option<Platform>) {
		self.flat.insert((ext, platform));
	}

	/// Applies configured overrides on top of the current associations.
	pub fn apply(&mut self, overrides: &ProfileOverrides) -> Result<(), DgdsError> {
		for (ext, tags) in &overrides.packed {
			let ext: Extension = ext.parse()?;
			let tags = tags.iter().map(|t| t.parse()).collect::<Result<BTreeSet<ChunkTag>, _>>()?;
			self.packed.insert(ext, tags);
		}
		for ext in &overrides.flat {
			self.set_flat(ext.parse()?, None);
		}
		Ok(())
	}

	/// Returns `true` if `ext` has any compression associations.
	pub fn has_profile(&self, ext: Extension) -> bool {
		self.packed.contains_key(&ext)
	}

	/// Returns `true` if leaf chunks tagged `tag` carry a compression prefix in `ext` files.
	///
	/// Pairs without an entry read as uncompressed.
	pub fn is_packed(&self, ext: Extension, tag: ChunkTag) -> bool {
		let packed = self.packed.get(&ext).is_some_and(|tags| tags.contains(&tag));
		if !packed {
			trace!("{ext}:{tag} not in the compression profile, reading raw");
		}
		packed
	}

	/// Returns `true` if `ext` files have no chunk framing on `platform`.
	pub fn is_flat(&self, ext: Extension, platform: Platform) -> bool {
		self.flat.contains(&(ext, None)) || self.flat.contains(&(ext, Some(platform)))
	}
}
