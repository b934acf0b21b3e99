//! Error types for archive, container and resource decoding.

use std::fmt;

use thiserror::Error;

/// The format a [`DgdsError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// Archive index file
	Index,
	/// Volume file
	Volume,
	/// Tagged chunk stream
	Chunk,
	/// Run-length codec
	Rle,
	/// LZW codec
	Lzw,
	/// Palette resource
	Palette,
	/// Bitmap resource (tiles, planes, matrices)
	Bitmap,
	/// Full-screen image
	Screen,
	/// String table
	Strings,
	/// Font resource
	Font,
	/// Scene script (TTM)
	SceneScript,
	/// Sequence script (ADS)
	SequenceScript,
	/// Song bank
	Song,
	/// Sound bank
	Sound,
	/// Flat (unframed) file
	Flat,
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Index => "index",
			Self::Volume => "volume",
			Self::Chunk => "chunk",
			Self::Rle => "rle",
			Self::Lzw => "lzw",
			Self::Palette => "palette",
			Self::Bitmap => "bitmap",
			Self::Screen => "screen",
			Self::Strings => "strings",
			Self::Font => "font",
			Self::SceneScript => "ttm",
			Self::SequenceScript => "ads",
			Self::Song => "song",
			Self::Sound => "sound",
			Self::Flat => "flat",
		};
		f.write_str(name)
	}
}

/// Errors raised while decoding archives, chunk streams and resources.
#[derive(Debug, Error)]
pub enum DgdsError {
	/// Not enough bytes left to decode a structure
	#[error("{file_type}: insufficient data, expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Format being decoded
		file_type: FileType,
		/// Number of bytes required
		expected: usize,
		/// Number of bytes available
		actual: usize,
	},

	/// Chunk tag not terminated by ':'
	#[error("chunk: malformed header at offset {offset}: {tag:02X?}")]
	InvalidChunkHeader {
		/// Stream offset of the header
		offset: usize,
		/// The raw tag bytes
		tag: [u8; 4],
	},

	/// Compressed input ended in the middle of a code or run
	#[error("{file_type}: bitstream underrun after {produced} of {expected} bytes")]
	BitstreamUnderrun {
		/// Codec that ran out of input
		file_type: FileType,
		/// Bytes produced before the underrun
		produced: usize,
		/// Bytes requested by the caller
		expected: usize,
	},

	/// LZW code that is neither in the dictionary nor the next free entry
	#[error("lzw: invalid code {code} (next free entry {next})")]
	InvalidCode {
		/// The offending code
		code: u16,
		/// Next dictionary entry at the time
		next: u16,
	},

	/// Unknown codec selector in a compressed chunk prefix
	#[error("{file_type}: unsupported compression method {method}")]
	UnsupportedCompression {
		/// Format being decoded
		file_type: FileType,
		/// The raw selector byte
		method: u8,
	},

	/// Decoder finished with a size other than the declared one
	#[error("{file_type}: decompression failed: {message}")]
	DecompressionError {
		/// Format being decoded
		file_type: FileType,
		/// Description of the failure
		message: String,
	},

	/// A resource file lacks a chunk it needs
	#[error("{file_type}: missing {tag} chunk")]
	MissingChunk {
		/// Format being decoded
		file_type: FileType,
		/// Tag of the missing chunk
		tag: String,
	},

	/// Declared size larger than its source could produce
	#[error("{file_type}: declared size {declared} exceeds the {limit} bytes available")]
	SizeLimitExceeded {
		/// Format being decoded
		file_type: FileType,
		/// Size claimed by the data
		declared: usize,
		/// Largest size the source allows
		limit: usize,
	},

	/// Structurally valid data with an impossible value
	#[error("{file_type}: {message}")]
	InvalidValue {
		/// Format being decoded
		file_type: FileType,
		/// Description of the value
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IoError(#[from] std::io::Error),
}

impl DgdsError {
	/// Shorthand for [`DgdsError::InsufficientData`].
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Shorthand for [`DgdsError::InvalidValue`].
	pub fn invalid_value(file_type: FileType, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			file_type,
			message: message.into(),
		}
	}

	/// Returns `true` for corrupt-stream errors that stop parsing of the current resource.
	pub fn is_format_error(&self) -> bool {
		matches!(
			self,
			Self::InsufficientData { .. }
				| Self::InvalidChunkHeader { .. }
				| Self::BitstreamUnderrun { .. }
				| Self::InvalidCode { .. }
				| Self::SizeLimitExceeded { .. }
				| Self::InvalidValue { .. }
		)
	}
}
