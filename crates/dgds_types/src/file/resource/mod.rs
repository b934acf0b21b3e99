//! Typed resources decoded from archive files.
//!
//! [`Resource::decode`] turns one leaf chunk into a typed value based on the file
//! extension and chunk tag. [`ResourceFile`] holds every decoded chunk of a file
//! (or its flat contents) and assembles the composite types: bitmap sets, screens,
//! scripts and audio banks.

pub mod audio;
pub mod bitmap;
pub mod flat;
pub mod font;
pub mod loader;
pub mod palette;
pub mod script;
pub mod strings;

use std::fmt;

use log::{debug, warn};

use crate::file::chunk::ChunkReader;
use crate::file::profile::{ChunkTag, Extension, Platform, ProfileTable};
use crate::file::reader::{ByteReader, fixed_str};
use crate::file::{DgdsError, FileType};

pub use audio::{SongBank, SoundBank, SoundInfo};
pub use bitmap::{Bitmap, BitmapSet, TileInfo, TileMatrix, TileTable, interleave_planes};
pub use flat::FlatFile;
pub use font::{Font, Glyph};
pub use loader::ResourceLoader;
pub use palette::{Color, Palette};
pub use script::{AdsData, TtmData};
pub use strings::StringTable;

/// A decoded leaf chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
	/// `VER` version string
	Version(String),
	/// `PAG` page count
	Pages(u16),
	/// 256-colour palette
	Palette(Palette),
	/// Bitmap tile table
	TileTable(TileTable),
	/// Bitmap tile grid
	TileMatrix(TileMatrix),
	/// A 4bpp (`BIN`/`VGA`) or 8bpp (`MA8`) pixel plane
	Plane(Vec<u8>),
	/// Indexed strings
	Strings(StringTable),
	/// Glyph font
	Font(Font),
	/// Script bytecode
	Code(Vec<u8>),
	/// One song
	Song(Vec<u8>),
	/// Song table
	SongInfo(Vec<u16>),
	/// Sound bank header
	SoundInfo(SoundInfo),
	/// Anything without a dedicated decoder
	Blob(Vec<u8>),
}

impl Resource {
	/// Decodes the payload of a leaf chunk.
	pub fn decode(
		extension: Extension,
		tag: ChunkTag,
		parent: Option<ChunkTag>,
		data: &[u8],
	) -> Result<Self, DgdsError> {
		let is_ads = matches!(extension, Extension::ADS | Extension::ADL | Extension::ADH);
		let resource = match (extension, tag) {
			(Extension::TTM, ChunkTag::VER) => Self::Version(fixed_str(data)),
			(_, ChunkTag::VER) if is_ads => Self::Version(fixed_str(data)),
			(Extension::TTM, ChunkTag::PAG) => {
				Self::Pages(ByteReader::new(data, FileType::SceneScript).read_u16_le()?)
			}
			(Extension::TTM, ChunkTag::TT3) => Self::Code(data.to_vec()),
			(_, ChunkTag::SCR) if is_ads => Self::Code(data.to_vec()),
			(_, ChunkTag::RES) if is_ads => Self::Strings(StringTable::from_bytes(data)?),
			(Extension::TTM | Extension::SX, ChunkTag::TAG) => Self::Strings(StringTable::from_bytes(data)?),
			(_, ChunkTag::TAG) if is_ads => Self::Strings(StringTable::from_bytes(data)?),
			(Extension::SX, ChunkTag::FNM) => Self::Strings(StringTable::from_bytes(data)?),
			(Extension::SX, ChunkTag::INF) => Self::SoundInfo(SoundInfo::from_bytes(data)?),
			(Extension::REQ, ChunkTag::REQ | ChunkTag::GAD) if parent == Some(ChunkTag::TAG) => {
				Self::Strings(StringTable::from_bytes(data)?)
			}
			(Extension::PAL, ChunkTag::VGA) => Self::Palette(Palette::from_vga_bytes(data)?),
			(Extension::BMP, ChunkTag::INF) => Self::TileTable(TileTable::from_bytes(data)?),
			(Extension::BMP, ChunkTag::MTX) => Self::TileMatrix(TileMatrix::from_bytes(data)?),
			(Extension::BMP, ChunkTag::BIN | ChunkTag::VGA) => Self::Plane(data.to_vec()),
			(Extension::SCR, ChunkTag::BIN | ChunkTag::VGA | ChunkTag::MA8) => Self::Plane(data.to_vec()),
			(Extension::FNT, ChunkTag::FNT) => Self::Font(Font::from_bytes(data)?),
			(Extension::SNG, ChunkTag::SNG) => Self::Song(data.to_vec()),
			(Extension::SNG, ChunkTag::INF) => Self::SongInfo(audio::read_u16_list(data, FileType::Song)?),
			_ => {
				debug!("No decoder for {extension}:{tag}, keeping {} bytes opaque", data.len());
				Self::Blob(data.to_vec())
			}
		};
		Ok(resource)
	}

	/// Short name of the variant.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Version(_) => "version",
			Self::Pages(_) => "pages",
			Self::Palette(_) => "palette",
			Self::TileTable(_) => "tiles",
			Self::TileMatrix(_) => "matrix",
			Self::Plane(_) => "plane",
			Self::Strings(_) => "strings",
			Self::Font(_) => "font",
			Self::Code(_) => "code",
			Self::Song(_) => "song",
			Self::SongInfo(_) => "song-info",
			Self::SoundInfo(_) => "sound-info",
			Self::Blob(_) => "blob",
		}
	}
}

/// A decoded leaf chunk with its position in the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChunk {
	/// Chunk tag
	pub tag: ChunkTag,
	/// Most recent container tag
	pub parent: Option<ChunkTag>,
	/// Decoded payload
	pub resource: Resource,
}

/// Contents of a resource file.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContent {
	/// Leaf chunks in stream order
	Chunks(Vec<DecodedChunk>),
	/// An unframed file
	Flat(FlatFile),
}

/// A fully decoded archive file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceFile {
	/// File name inside the archive
	pub name: String,
	/// Extension taken from the name
	pub extension: Option<Extension>,
	/// Decoded contents
	pub content: ResourceContent,
}

impl ResourceFile {
	/// Decodes `data` as the file `name`.
	///
	/// Flat files are recognised through `profiles` and `platform`. Chunks with an
	/// unknown compression method are skipped with a warning; any other failure
	/// abandons the file.
	pub fn parse(name: &str, data: &[u8], profiles: &ProfileTable, platform: Platform) -> Result<Self, DgdsError> {
		let Some(extension) = Extension::from_filename(name) else {
			debug!("{name} has no extension, keeping it raw");
			return Ok(Self {
				name: name.to_owned(),
				extension: None,
				content: ResourceContent::Flat(FlatFile::Raw(data.to_vec())),
			});
		};

		if profiles.is_flat(extension, platform) {
			return Ok(Self {
				name: name.to_owned(),
				extension: Some(extension),
				content: ResourceContent::Flat(FlatFile::parse(extension, data)?),
			});
		}

		let mut reader = ChunkReader::new(data, extension, profiles);
		let mut chunks = Vec::new();
		loop {
			let chunk = match reader.next_chunk() {
				Ok(Some(chunk)) => chunk,
				Ok(None) => break,
				Err(DgdsError::UnsupportedCompression {
					method,
					..
				}) => {
					warn!("{name}: skipping chunk with compression method {method}");
					continue;
				}
				Err(err) => return Err(err),
			};
			if chunk.is_container() {
				continue;
			}
			let resource = Resource::decode(extension, chunk.tag(), chunk.parent, chunk.bytes())?;
			chunks.push(DecodedChunk {
				tag: chunk.tag(),
				parent: chunk.parent,
				resource,
			});
		}

		Ok(Self {
			name: name.to_owned(),
			extension: Some(extension),
			content: ResourceContent::Chunks(chunks),
		})
	}

	/// Leaf chunks, empty for flat files.
	pub fn chunks(&self) -> &[DecodedChunk] {
		match &self.content {
			ResourceContent::Chunks(chunks) => chunks,
			ResourceContent::Flat(_) => &[],
		}
	}

	/// The flat contents, if the file is unframed.
	pub fn flat(&self) -> Option<&FlatFile> {
		match &self.content {
			ResourceContent::Flat(flat) => Some(flat),
			ResourceContent::Chunks(_) => None,
		}
	}

	/// First chunk tagged `tag`.
	pub fn find(&self, tag: ChunkTag) -> Option<&Resource> {
		self.find_all(tag).next()
	}

	/// Every chunk tagged `tag`, in stream order.
	pub fn find_all(&self, tag: ChunkTag) -> impl Iterator<Item = &Resource> {
		self.chunks().iter().filter(move |c| c.tag == tag).map(|c| &c.resource)
	}

	fn missing(file_type: FileType, tag: ChunkTag) -> DgdsError {
		DgdsError::MissingChunk {
			file_type,
			tag: tag.to_string(),
		}
	}

	fn plane(&self, file_type: FileType, tag: ChunkTag) -> Result<&[u8], DgdsError> {
		match self.find(tag) {
			Some(Resource::Plane(plane)) => Ok(plane),
			_ => Err(Self::missing(file_type, tag)),
		}
	}

	fn strings(&self, tag: ChunkTag) -> StringTable {
		match self.find(tag) {
			Some(Resource::Strings(table)) => table.clone(),
			_ => StringTable::default(),
		}
	}

	fn version(&self) -> String {
		match self.find(ChunkTag::VER) {
			Some(Resource::Version(version)) => version.clone(),
			_ => String::new(),
		}
	}

	/// The palette of a `PAL` file.
	pub fn palette(&self) -> Result<Palette, DgdsError> {
		match self.find(ChunkTag::VGA) {
			Some(Resource::Palette(palette)) => Ok(palette.clone()),
			_ => Err(Self::missing(FileType::Palette, ChunkTag::VGA)),
		}
	}

	/// Tile table, planes and matrix of a `BMP` file.
	pub fn bitmap_set(&self) -> Result<BitmapSet, DgdsError> {
		let Some(Resource::TileTable(table)) = self.find(ChunkTag::INF) else {
			return Err(Self::missing(FileType::Bitmap, ChunkTag::INF));
		};
		let matrix = match self.find(ChunkTag::MTX) {
			Some(Resource::TileMatrix(matrix)) => Some(matrix.clone()),
			_ => None,
		};
		Ok(BitmapSet {
			table: table.clone(),
			bin: self.plane(FileType::Bitmap, ChunkTag::BIN)?.to_vec(),
			vga: self.plane(FileType::Bitmap, ChunkTag::VGA)?.to_vec(),
			matrix,
		})
	}

	/// The 320×200 image of a `SCR` file, preferring `MA8` over `BIN`/`VGA`.
	pub fn screen(&self) -> Result<Bitmap, DgdsError> {
		if let Ok(ma8) = self.plane(FileType::Screen, ChunkTag::MA8) {
			return Bitmap::screen_from_ma8(ma8);
		}
		let bin = self.plane(FileType::Screen, ChunkTag::BIN)?;
		let vga = self.plane(FileType::Screen, ChunkTag::VGA)?;
		Bitmap::screen_from_planes(bin, vga)
	}

	/// The font of a `FNT` file.
	pub fn font(&self) -> Result<Font, DgdsError> {
		match self.find(ChunkTag::FNT) {
			Some(Resource::Font(font)) => Ok(font.clone()),
			_ => Err(Self::missing(FileType::Font, ChunkTag::FNT)),
		}
	}

	/// The scene script of a `TTM` file.
	pub fn scene_script(&self) -> Result<TtmData, DgdsError> {
		let Some(Resource::Code(code)) = self.find(ChunkTag::TT3) else {
			return Err(Self::missing(FileType::SceneScript, ChunkTag::TT3));
		};
		let pages = match self.find(ChunkTag::PAG) {
			Some(Resource::Pages(pages)) => *pages,
			_ => 0,
		};
		Ok(TtmData {
			name: self.name.clone(),
			version: self.version(),
			pages,
			code: code.clone(),
			tags: self.strings(ChunkTag::TAG),
		})
	}

	/// The sequence script of an `ADS` file, without its scenes.
	pub fn sequence_script(&self) -> Result<AdsData, DgdsError> {
		let Some(Resource::Code(code)) = self.find(ChunkTag::SCR) else {
			return Err(Self::missing(FileType::SequenceScript, ChunkTag::SCR));
		};
		Ok(AdsData {
			name: self.name.clone(),
			version: self.version(),
			resources: self.strings(ChunkTag::RES),
			code: code.clone(),
			tags: self.strings(ChunkTag::TAG),
			scenes: Default::default(),
		})
	}

	/// Songs and song table of a `SNG` file.
	pub fn song_bank(&self) -> Result<SongBank, DgdsError> {
		let songs: Vec<_> = self
			.find_all(ChunkTag::SNG)
			.filter_map(|r| match r {
				Resource::Song(song) => Some(song.clone()),
				_ => None,
			})
			.collect();
		if songs.is_empty() {
			return Err(Self::missing(FileType::Song, ChunkTag::SNG));
		}
		let info = match self.find(ChunkTag::INF) {
			Some(Resource::SongInfo(info)) => info.clone(),
			_ => Vec::new(),
		};
		Ok(SongBank {
			songs,
			info,
		})
	}

	/// Sample table, names and data of an `SX` file.
	pub fn sound_bank(&self) -> Result<SoundBank, DgdsError> {
		let Some(Resource::SoundInfo(info)) = self.find(ChunkTag::INF) else {
			return Err(Self::missing(FileType::Sound, ChunkTag::INF));
		};
		let data = self
			.find_all(ChunkTag::DAT)
			.filter_map(|r| match r {
				Resource::Blob(blob) => Some(blob.clone()),
				_ => None,
			})
			.collect();
		Ok(SoundBank {
			info: info.clone(),
			tags: self.strings(ChunkTag::TAG),
			names: self.strings(ChunkTag::FNM),
			data,
		})
	}
}

impl fmt::Display for ResourceFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.content {
			ResourceContent::Chunks(chunks) => {
				writeln!(f, "{} ({} chunks)", self.name, chunks.len())?;
				for chunk in chunks {
					match chunk.parent {
						Some(parent) => writeln!(f, "  {parent}/{} {}", chunk.tag, chunk.resource.kind())?,
						None => writeln!(f, "  {} {}", chunk.tag, chunk.resource.kind())?,
					}
				}
				Ok(())
			}
			ResourceContent::Flat(_) => writeln!(f, "{} (flat)", self.name),
		}
	}
}
