//! Variable-width LZW codec.
//!
//! ## Code space
//!
//! | Code        | Meaning                                    |
//! |-------------|--------------------------------------------|
//! | `0..=255`   | literal byte                               |
//! | `256`       | clear: width back to 9, dictionary to roots |
//! | `257`       | end of stream                              |
//! | `258..4096` | dictionary entries                         |
//!
//! Codes are packed least-significant bit first and start 9 bits wide. After each
//! dictionary insertion the width grows by one once the next free entry reaches
//! `1 << width`, up to 12 bits. Once all 4096 entries are used the dictionary is
//! frozen until the next clear.
//!
//! Entries are numbered from `0x101`. Every code adds `(previous code, first byte
//! of this expansion)`, except the first code after a clear, which is a literal and
//! adds nothing. A stream starts as if a zero byte had already been decoded, so its
//! first code fills entry `0x101` and the first usable entry is `0x102`. After a
//! clear the entry built from the second code lands on `0x101`, which the end code
//! shadows, and the next one is `0x102`.
//!
//! A code at or beyond the next free entry ("KwKwK") expands to the previous
//! expansion followed by its own first byte.

use std::collections::HashMap;

use log::trace;

use super::CodecOutput;
use super::bits::{BitReader, BitWriter};
use crate::file::{DgdsError, FileType};

/// Dictionary reset code.
pub const CLEAR_CODE: u16 = 0x100;

/// End-of-stream code.
pub const END_CODE: u16 = 0x101;

/// Number assigned to the first dictionary entry.
const FIRST_ENTRY: u16 = 0x101;

/// Code width after start and after each clear.
pub const MIN_CODE_WIDTH: u32 = 9;

/// Widest code the stream may use.
pub const MAX_CODE_WIDTH: u32 = 12;

/// Total addressable codes at the widest width.
const TABLE_SIZE: usize = 1 << MAX_CODE_WIDTH;

/// Width a reader uses while `next_free` is the next entry to be assigned.
fn width_for(next_free: u16) -> u32 {
	(u16::BITS - next_free.leading_zeros()).clamp(MIN_CODE_WIDTH, MAX_CODE_WIDTH)
}

/// One dictionary entry: the code it extends plus the appended byte.
///
/// Prefixes always point at lower codes, so chains terminate at a root.
#[derive(Debug, Clone, Copy)]
struct Entry {
	prefix: u16,
	byte: u8,
}

/// Decoder state, reset at the start of every stream and on each clear code.
#[derive(Debug)]
pub struct Decoder {
	width: u32,
	entries: Vec<Entry>,
	scratch: Vec<u8>,
}

impl Default for Decoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Decoder {
	/// Creates a decoder with an empty dictionary.
	pub fn new() -> Self {
		Self {
			width: MIN_CODE_WIDTH,
			entries: Vec::with_capacity(TABLE_SIZE - usize::from(FIRST_ENTRY)),
			scratch: Vec::new(),
		}
	}

	/// Current code width in bits.
	pub fn code_width(&self) -> u32 {
		self.width
	}

	/// Number of dictionary entries, counting the 256 literal roots.
	pub fn entry_count(&self) -> usize {
		256 + self.entries.len()
	}

	fn next_free(&self) -> u16 {
		FIRST_ENTRY + self.entries.len() as u16
	}

	fn reset(&mut self) {
		self.width = MIN_CODE_WIDTH;
		self.entries.clear();
	}

	/// Writes the expansion of `code` into the scratch buffer.
	fn expand(&mut self, code: u16) {
		self.scratch.clear();
		let mut code = code;
		while code >= FIRST_ENTRY {
			let entry = self.entries[usize::from(code - FIRST_ENTRY)];
			self.scratch.push(entry.byte);
			code = entry.prefix;
		}
		self.scratch.push(code as u8);
		self.scratch.reverse();
	}

	/// Decodes `input` into `output`.
	///
	/// Stops at the end code or once `output` is full, whichever comes first.
	/// Input ending before either is an error.
	pub fn decode(&mut self, output: &mut [u8], input: &[u8]) -> Result<CodecOutput, DgdsError> {
		self.reset();

		let mut bits = BitReader::new(input);
		let mut produced = 0;
		// As if a zero byte had already been decoded
		let mut prev: Option<u16> = Some(0);

		while produced < output.len() {
			let Some(mut code) = bits.read(self.width) else {
				return Err(DgdsError::BitstreamUnderrun {
					file_type: FileType::Lzw,
					produced,
					expected: output.len(),
				});
			};

			if code == CLEAR_CODE {
				trace!("lzw: clear after {produced} bytes ({} entries)", self.entry_count());
				self.reset();
				prev = None;
				continue;
			}
			if code == END_CODE {
				break;
			}

			let next = self.next_free();
			match prev {
				None => {
					if code > 0xFF {
						return Err(DgdsError::InvalidCode {
							code,
							next,
						});
					}
					self.scratch.clear();
					self.scratch.push(code as u8);
				}
				Some(prev_code) => {
					let kwkwk = code >= next;
					if kwkwk {
						self.expand(prev_code);
						let first = self.scratch[0];
						self.scratch.push(first);
					} else {
						self.expand(code);
					}

					if usize::from(next) < TABLE_SIZE {
						self.entries.push(Entry {
							prefix: prev_code,
							byte: self.scratch[0],
						});
						if u32::from(self.next_free()) == 1 << self.width && self.width < MAX_CODE_WIDTH {
							self.width += 1;
						}
					}
					// From here on the code names the entry just built
					if kwkwk {
						trace!("lzw: code {code} at next free entry {next}");
						code = next;
					}
				}
			}

			let count = self.scratch.len().min(output.len() - produced);
			output[produced..produced + count].copy_from_slice(&self.scratch[..count]);
			produced += count;
			prev = Some(code);
		}

		Ok(CodecOutput {
			produced,
			consumed: bits.bytes_consumed(),
		})
	}
}

/// Greedy LZW encoder producing streams [`Decoder`] accepts.
///
/// The encoder tracks the reader's dictionary size, which trails its own by one
/// entry, so each code is written at the width the reader expects. Entry `0x101`
/// is numbered but never emitted.
#[derive(Debug)]
pub struct Encoder {
	writer: BitWriter,
	dictionary: HashMap<(u16, u8), u16>,
	next_free: u16,
	reader_next_free: u16,
	// The reader adds no entry for the first code after a clear
	literal_pending: bool,
}

impl Default for Encoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Encoder {
	/// Creates an encoder at the start of a stream.
	pub fn new() -> Self {
		Self {
			writer: BitWriter::new(),
			dictionary: HashMap::new(),
			next_free: FIRST_ENTRY + 1,
			reader_next_free: FIRST_ENTRY,
			literal_pending: false,
		}
	}

	fn emit(&mut self, code: u16) {
		self.writer.write(code, width_for(self.reader_next_free));
		if self.literal_pending {
			self.literal_pending = false;
		} else if usize::from(self.reader_next_free) < TABLE_SIZE {
			self.reader_next_free += 1;
		}
	}

	/// Encodes one segment of input with the current dictionary.
	pub fn push(&mut self, input: &[u8]) {
		let mut current: Option<u16> = None;
		for &byte in input {
			let Some(code) = current else {
				current = Some(u16::from(byte));
				continue;
			};
			if let Some(&extended) = self.dictionary.get(&(code, byte)) {
				current = Some(extended);
				continue;
			}
			self.emit(code);
			if usize::from(self.next_free) < TABLE_SIZE {
				if self.next_free != END_CODE {
					self.dictionary.insert((code, byte), self.next_free);
				}
				self.next_free += 1;
			}
			current = Some(u16::from(byte));
		}
		if let Some(code) = current {
			self.emit(code);
		}
	}

	/// Emits a clear code and resets both dictionaries.
	pub fn clear(&mut self) {
		self.writer.write(CLEAR_CODE, width_for(self.reader_next_free));
		self.dictionary.clear();
		self.next_free = FIRST_ENTRY;
		self.reader_next_free = FIRST_ENTRY;
		self.literal_pending = true;
	}

	/// Emits the end code and returns the packed stream.
	pub fn finish(mut self) -> Vec<u8> {
		self.writer.write(END_CODE, width_for(self.reader_next_free));
		self.writer.finish()
	}
}

/// Encodes `input` as a single LZW stream.
///
/// Segment boundaries inside one [`Encoder::push`] call are not preserved; use
/// [`encode_segments`] to place clear codes.
pub fn encode(input: &[u8]) -> Vec<u8> {
	encode_segments(&[input])
}

/// Encodes each segment with a fresh dictionary, separated by clear codes.
pub fn encode_segments(segments: &[&[u8]]) -> Vec<u8> {
	let mut encoder = Encoder::new();
	for (i, segment) in segments.iter().enumerate() {
		if i > 0 {
			encoder.clear();
		}
		encoder.push(segment);
	}
	encoder.finish()
}
