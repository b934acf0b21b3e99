//! Run-length codec.
//!
//! Each control byte selects one of three run kinds:
//!
//! | Control     | Meaning                                               |
//! |-------------|-------------------------------------------------------|
//! | `0..=127`   | literal run: that many bytes follow and are copied     |
//! | `128`       | no-op                                                 |
//! | `129..=255` | fill run: `control & 0x7F` copies of the next byte     |
//!
//! Decoding stops once the output buffer is full. A literal run that crosses the
//! end of the output still consumes all of its source bytes.

use super::CodecOutput;
use crate::file::{DgdsError, FileType};

/// Longest run a single control byte can describe.
const MAX_RUN: usize = 0x7F;

/// Decodes `input` into `output` until `output` is full.
///
/// Running out of input before the output is full is an error.
pub fn decode(output: &mut [u8], input: &[u8]) -> Result<CodecOutput, DgdsError> {
	let capacity = output.len();
	let underrun = |produced| DgdsError::BitstreamUnderrun {
		file_type: FileType::Rle,
		produced,
		expected: capacity,
	};

	let mut produced = 0;
	let mut pos = 0;

	while produced < capacity {
		let control = *input.get(pos).ok_or_else(|| underrun(produced))?;
		pos += 1;

		match control {
			0x80 => {}
			0..=0x7F => {
				let len = usize::from(control);
				if pos + len > input.len() {
					return Err(underrun(produced));
				}
				let count = len.min(capacity - produced);
				output[produced..produced + count].copy_from_slice(&input[pos..pos + count]);
				produced += count;
				pos += len;
			}
			_ => {
				let len = usize::from(control & 0x7F);
				let value = *input.get(pos).ok_or_else(|| underrun(produced))?;
				pos += 1;
				let count = len.min(capacity - produced);
				output[produced..produced + count].fill(value);
				produced += count;
			}
		}
	}

	Ok(CodecOutput {
		produced,
		consumed: pos,
	})
}

/// Encodes `input` with fill runs for three or more equal bytes and literal runs otherwise.
pub fn encode(input: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(input.len() + input.len() / MAX_RUN + 1);
	let mut i = 0;

	while i < input.len() {
		let value = input[i];
		let run = input[i..].iter().take(MAX_RUN).take_while(|&&b| b == value).count();
		if run >= 3 {
			out.push(0x80 | run as u8);
			out.push(value);
			i += run;
			continue;
		}

		let start = i;
		while i < input.len() && i - start < MAX_RUN {
			if i + 2 < input.len() && input[i] == input[i + 1] && input[i] == input[i + 2] {
				break;
			}
			i += 1;
		}
		out.push((i - start) as u8);
		out.extend_from_slice(&input[start..i]);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::SmallRng;
	use rand::{Rng, SeedableRng};

	fn round_trip(data: &[u8]) {
		let encoded = encode(data);
		let mut output = vec![0u8; data.len()];
		let result = decode(&mut output, &encoded).unwrap();
		assert_eq!(output, data);
		assert_eq!(result.produced, data.len());
		assert_eq!(result.consumed, encoded.len());
	}

	#[test]
	fn test_decode_runs() {
		let input = [0x03, b'a', b'b', b'c', 0x80, 0x84, b'z', 0x01, b'!'];
		let mut output = [0u8; 8];
		let result = decode(&mut output, &input).unwrap();
		assert_eq!(&output, b"abczzzz!");
		assert_eq!(result.produced, 8);
		assert_eq!(result.consumed, input.len());
	}

	#[test]
	fn test_literal_run_truncated_at_capacity() {
		let input = [0x05, 1, 2, 3, 4, 5, 0x83, 9];
		let mut output = [0u8; 3];
		let result = decode(&mut output, &input).unwrap();
		assert_eq!(output, [1, 2, 3]);
		assert_eq!(result.produced, 3);
		// Control byte plus the whole five-byte run
		assert_eq!(result.consumed, 6);
	}

	#[test]
	fn test_fill_run_truncated_at_capacity() {
		let mut output = [0u8; 2];
		let result = decode(&mut output, &[0xFF, 7]).unwrap();
		assert_eq!(output, [7, 7]);
		assert_eq!(result.consumed, 2);
	}

	#[test]
	fn test_underrun_is_an_error() {
		let mut output = [0u8; 4];
		assert!(matches!(
			decode(&mut output, &[0x02, 1, 2]),
			Err(DgdsError::BitstreamUnderrun {
				file_type: FileType::Rle,
				produced: 2,
				expected: 4,
			})
		));
		// Literal run whose bytes are cut off
		assert!(decode(&mut output, &[0x04, 1, 2]).is_err());
		// Fill run without its value byte
		assert!(decode(&mut output, &[0x84]).is_err());
	}

	#[test]
	fn test_round_trip() {
		round_trip(b"");
		round_trip(b"x");
		round_trip(b"aaaaaaaaaaaaaaaaaaaaaaaaaaabcabcabcddd");
		round_trip(&[0u8; 1000]);

		let mut rng = SmallRng::seed_from_u64(0x5EED);
		let mut data = Vec::new();
		for _ in 0..200 {
			let value: u8 = rng.random();
			let len = rng.random_range(1..300);
			if rng.random_bool(0.5) {
				data.extend(std::iter::repeat_n(value, len));
			} else {
				data.extend((0..len).map(|_| rng.random::<u8>()));
			}
		}
		round_trip(&data);
	}
}
