//! This crate provides archive access and resource decoding for the `dgds-rs` project.
//!
//! # Layers
//!
//! - **Archive**: an index file of salted name hashes pointing into volume files
//! - **Chunks**: tagged, optionally nested streams; some payloads are compressed
//! - **Codecs**: run-length and variable-width LZW decompression
//! - **Resources**: palettes, tiled bitmaps, screens, fonts, string tables, scripts
//!   and audio banks decoded from chunk streams
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use dgds_types::prelude::*;
//!
//! let archive = Archive::open("RESOURCE.MAP")?;
//! let loader = ResourceLoader::new(archive);
//! if let Some(palette) = loader.load_palette("DYNAMIX.PAL")? {
//! 	println!("first colour {}", palette[0]);
//! }
//! # Ok::<(), DgdsError>(())
//! ```
//!
//! Or use explicit paths:
//!
//! ```
//! use dgds_types::file::codec::{Compression, compress, decompress};
//!
//! let packed = compress(Compression::Lzw, b"TOBEORNOTTOBE");
//! assert_eq!(decompress(Compression::Lzw, &packed, 13).unwrap(), b"TOBEORNOTTOBE");
//! ```

pub mod file;

/// `use dgds_types::prelude::*;` to import commonly used items.
pub mod prelude;
