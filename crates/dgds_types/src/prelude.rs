//! Prelude module for `dgds_types`.
//!
//! ```no_run
//! use dgds_types::prelude::*;
//!
//! let archive = Archive::open("RESOURCE.MAP").unwrap();
//! let entries = archive.entries().unwrap();
//! ```

#[doc(inline)]
pub use crate::file::{
	// Archive
	Archive,
	ArchiveBuilder,
	ArchiveEntry,

	// Scripts
	AdsData,

	// Images
	Bitmap,
	BitmapSet,

	// Chunks
	ChunkBuilder,
	ChunkReader,
	ChunkTag,
	Color,
	Compression,

	// Errors
	DgdsError,
	Extension,
	FileType,
	Font,
	Palette,
	Platform,
	ProfileOverrides,
	ProfileTable,

	// Resources
	Resource,
	ResourceFile,
	ResourceLoader,
	StringTable,
	TtmData,
};
