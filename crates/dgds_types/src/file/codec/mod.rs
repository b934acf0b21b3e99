//! Chunk payload codecs.
//!
//! A compressed chunk payload starts with a one-byte [`Compression`] selector and a
//! little-endian `u32` holding the unpacked size; the rest of the payload is the
//! coded data.

mod bits;
pub mod lzw;
pub mod rle;

use std::fmt;

use crate::file::{DgdsError, FileType};

/// Byte counts reported by a decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOutput {
	/// Bytes written to the output buffer
	pub produced: usize,
	/// Bytes read from the input, counting a partially used final byte
	pub consumed: usize,
}

/// Codec selector stored in front of compressed chunk payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compression {
	/// Stored as-is
	None = 0,
	/// Run-length coded
	Rle = 1,
	/// LZW coded
	Lzw = 2,
}

impl TryFrom<u8> for Compression {
	type Error = DgdsError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::None),
			1 => Ok(Self::Rle),
			2 => Ok(Self::Lzw),
			method => Err(DgdsError::UnsupportedCompression {
				file_type: FileType::Chunk,
				method,
			}),
		}
	}
}

impl From<Compression> for u8 {
	fn from(value: Compression) -> Self {
		value as u8
	}
}

impl fmt::Display for Compression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => write!(f, "none"),
			Self::Rle => write!(f, "rle"),
			Self::Lzw => write!(f, "lzw"),
		}
	}
}

/// Upper bound on any unpacked payload.
pub const MAX_UNPACKED_SIZE: usize = 16 << 20;

/// Most bytes `method` can produce from `input_len` bytes of input.
pub fn max_unpacked_size(method: Compression, input_len: usize) -> usize {
	let bound = match method {
		Compression::None => input_len,
		// A fill run turns two bytes into 127
		Compression::Rle => (input_len / 2).saturating_mul(127),
		// Codes are at least 9 bits and the n-th expands to at most n bytes
		Compression::Lzw => {
			let codes = input_len.saturating_mul(8) / lzw::MIN_CODE_WIDTH as usize;
			codes.saturating_mul(codes.min(1 << lzw::MAX_CODE_WIDTH))
		}
	};
	bound.min(MAX_UNPACKED_SIZE)
}

/// Decodes `input` into a buffer of exactly `unpacked_size` bytes.
///
/// Producing fewer bytes than declared is an error, as is declaring more than
/// [`max_unpacked_size`] allows.
pub fn decompress(method: Compression, input: &[u8], unpacked_size: usize) -> Result<Vec<u8>, DgdsError> {
	let limit = max_unpacked_size(method, input.len());
	if unpacked_size > limit {
		return Err(DgdsError::SizeLimitExceeded {
			file_type: FileType::Chunk,
			declared: unpacked_size,
			limit,
		});
	}
	let mut output = vec![0u8; unpacked_size];
	let result = match method {
		Compression::None => {
			output.copy_from_slice(&input[..unpacked_size]);
			return Ok(output);
		}
		Compression::Rle => rle::decode(&mut output, input)?,
		Compression::Lzw => lzw::Decoder::new().decode(&mut output, input)?,
	};

	if result.produced != unpacked_size {
		return Err(DgdsError::DecompressionError {
			file_type: FileType::Chunk,
			message: format!(
				"{method} stream ended after {} of {unpacked_size} bytes",
				result.produced
			),
		});
	}
	Ok(output)
}

/// Encodes `input` with the given method.
pub fn compress(method: Compression, input: &[u8]) -> Vec<u8> {
	match method {
		Compression::None => input.to_vec(),
		Compression::Rle => rle::encode(input),
		Compression::Lzw => lzw::encode(input),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_selector_values() {
		assert_eq!(Compression::try_from(2).unwrap(), Compression::Lzw);
		assert_eq!(u8::from(Compression::Rle), 1);
		assert!(matches!(
			Compression::try_from(7),
			Err(DgdsError::UnsupportedCompression {
				method: 7,
				..
			})
		));
	}

	#[test]
	fn test_decompress_each_method() {
		let data = b"the quick brown fox, the quick brown fox, aaaaaaaaaaaaaaaaa".to_vec();
		for method in [Compression::None, Compression::Rle, Compression::Lzw] {
			let packed = compress(method, &data);
			assert_eq!(decompress(method, &packed, data.len()).unwrap(), data, "{method}");
		}
	}

	#[test]
	fn test_short_lzw_stream_is_an_error() {
		let packed = compress(Compression::Lzw, b"abc");
		let err = decompress(Compression::Lzw, &packed, 10).unwrap_err();
		assert!(matches!(err, DgdsError::DecompressionError { .. }));
		assert!(decompress(Compression::None, b"ab", 3).is_err());
	}

	#[test]
	fn test_oversized_declaration_is_rejected() {
		// Nine bytes of LZW hold at most eight codes
		let packed = [0u8; 9];
		assert!(matches!(
			decompress(Compression::Lzw, &packed, 0xFFFF_FFF0),
			Err(DgdsError::SizeLimitExceeded {
				file_type: FileType::Chunk,
				declared: 0xFFFF_FFF0,
				limit: 64,
			})
		));
		assert!(matches!(
			decompress(Compression::Rle, &[0xFF, 7, 0xFF, 7], 255),
			Err(DgdsError::SizeLimitExceeded {
				limit: 254,
				..
			})
		));
		assert_eq!(decompress(Compression::Rle, &[0xFF, 7, 0xFF, 7], 254).unwrap(), vec![7; 254]);
	}

	#[test]
	fn test_expansion_bounds() {
		assert_eq!(max_unpacked_size(Compression::None, 10), 10);
		assert_eq!(max_unpacked_size(Compression::Rle, 5), 254);
		assert_eq!(max_unpacked_size(Compression::Lzw, 9), 64);
		assert_eq!(max_unpacked_size(Compression::Lzw, usize::MAX / 4), MAX_UNPACKED_SIZE);
	}
}
