//! Archive, container and resource support for the `dgds-rs` project.

mod error;

pub mod archive;
pub mod chunk;
pub mod codec;
pub mod profile;
pub mod reader;
pub mod resource;

// Re-export unified error type
pub use error::{DgdsError, FileType};

// Re-export the main entry points
pub use archive::{Archive, ArchiveBuilder, ArchiveEntry, IndexFile, dgds_hash};
pub use chunk::{Chunk, ChunkBuilder, ChunkHeader, ChunkReader};
pub use codec::{Compression, compress, decompress};
pub use profile::{ChunkTag, Extension, Platform, ProfileOverrides, ProfileTable};
pub use resource::{
	AdsData, Bitmap, BitmapSet, Color, Font, Glyph, Palette, Resource, ResourceFile, ResourceLoader,
	StringTable, TileMatrix, TtmData,
};
