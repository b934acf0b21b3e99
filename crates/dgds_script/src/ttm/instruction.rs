//! Raw scene script instructions.
//!
//! Each instruction starts with a `u16`: the high 12 bits select the opcode and the
//! low 4 bits give the operand count. A count of 15 means a single string operand,
//! stored as NUL-terminated text padded to an even length; any other count is that
//! many `i16` values.

use std::fmt;

use dgds_types::file::reader::{ByteReader, fixed_str};
use dgds_types::file::{DgdsError, FileType};

use super::opcode;

/// Operand count marking a string operand.
pub const STRING_OPERAND: u16 = 0x0F;

/// Operands of one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
	/// Signed 16-bit values
	Ints(Vec<i16>),
	/// One string
	Text(String),
}

impl Operands {
	/// The integer operands, empty for a string.
	pub fn ints(&self) -> &[i16] {
		match self {
			Self::Ints(values) => values,
			Self::Text(_) => &[],
		}
	}

	/// The string operand, if any.
	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Ints(_) => None,
		}
	}
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
	/// Byte offset in the script
	pub offset: usize,
	/// Opcode with the count bits cleared
	pub opcode: u16,
	/// Decoded operands
	pub operands: Operands,
}

impl Instruction {
	/// Decodes the instruction at `offset`, or `None` at the end of the script.
	///
	/// Returns the instruction and the offset of the next one.
	pub fn decode(code: &[u8], offset: usize) -> Result<Option<(Self, usize)>, DgdsError> {
		let mut reader = ByteReader::new(code, FileType::SceneScript);
		reader.seek(offset)?;
		if reader.is_empty() {
			return Ok(None);
		}

		let word = reader.read_u16_le()?;
		let opcode = word & 0xFFF0;
		let count = word & 0x000F;
		let operands = if count == STRING_OPERAND {
			Operands::Text(read_padded_string(&mut reader)?)
		} else {
			Operands::Ints((0..count).map(|_| reader.read_i16_le()).collect::<Result<_, _>>()?)
		};

		Ok(Some((
			Self {
				offset,
				opcode,
				operands,
			},
			reader.position(),
		)))
	}

	/// Encodes the instruction back to bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		match &self.operands {
			Operands::Ints(values) => {
				out.extend_from_slice(&(self.opcode | values.len() as u16).to_le_bytes());
				for value in values {
					out.extend_from_slice(&value.to_le_bytes());
				}
			}
			Operands::Text(text) => {
				out.extend_from_slice(&(self.opcode | STRING_OPERAND).to_le_bytes());
				out.extend_from_slice(text.as_bytes());
				out.push(0);
				if out.len() % 2 != 0 {
					out.push(0);
				}
			}
		}
		out
	}
}

/// Reads byte pairs until a pair contains a NUL.
fn read_padded_string(reader: &mut ByteReader<'_>) -> Result<String, DgdsError> {
	let mut bytes = Vec::new();
	loop {
		let pair: [u8; 2] = reader.read_array()?;
		bytes.extend_from_slice(&pair);
		if pair.contains(&0) {
			return Ok(fixed_str(&bytes));
		}
	}
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04X}: ", self.offset)?;
		match opcode::mnemonic(self.opcode) {
			Some(name) => write!(f, "{name:<12}")?,
			None => write!(f, "OP_{:04X}     ", self.opcode)?,
		}
		match &self.operands {
			Operands::Text(text) => write!(f, " \"{text}\""),
			Operands::Ints(values) => {
				for (i, value) in values.iter().enumerate() {
					let sep = if i == 0 { " " } else { ", " };
					write!(f, "{sep}{value}")?;
				}
				Ok(())
			}
		}
	}
}

/// Decodes every instruction of a script, stopping at the first malformed one.
pub fn disassemble(code: &[u8]) -> Result<Vec<Instruction>, DgdsError> {
	let mut instructions = Vec::new();
	let mut offset = 0;
	while let Some((instruction, next)) = Instruction::decode(code, offset)? {
		instructions.push(instruction);
		offset = next;
	}
	Ok(instructions)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_ints() {
		let code = [0x22, 0xA5, 10, 0, 0xEC, 0xFF];
		let (instruction, next) = Instruction::decode(&code, 0).unwrap().unwrap();
		assert_eq!(instruction.opcode, 0xA520);
		assert_eq!(instruction.operands, Operands::Ints(vec![10, -20]));
		assert_eq!(next, 6);
		assert!(Instruction::decode(&code, 6).unwrap().is_none());
	}

	#[test]
	fn test_decode_string_pairs() {
		// "AB" + NUL padding, then "ABC" + NUL
		let mut code = vec![0x2F, 0xF0, b'A', b'B', 0, 0];
		code.extend_from_slice(&[0x1F, 0xF0, b'A', b'B', b'C', 0]);
		let instructions = disassemble(&code).unwrap();
		assert_eq!(instructions.len(), 2);
		assert_eq!(instructions[0].operands.text(), Some("AB"));
		assert_eq!(instructions[1].opcode, 0xF010);
		assert_eq!(instructions[1].operands.text(), Some("ABC"));
		assert_eq!(instructions[1].offset, 6);
	}

	#[test]
	fn test_truncated_instruction() {
		assert!(Instruction::decode(&[0x22, 0xA5, 10, 0], 0).is_err());
		assert!(Instruction::decode(&[0x2F, 0xF0, b'A', b'B'], 0).is_err());
		assert!(disassemble(&[0x00]).is_err());
	}

	#[test]
	fn test_to_bytes_reparses() {
		let text = Instruction {
			offset: 0,
			opcode: 0xF020,
			operands: Operands::Text("TILES.BMP".into()),
		};
		let bytes = text.to_bytes();
		assert_eq!(bytes.len() % 2, 0);
		assert_eq!(Instruction::decode(&bytes, 0).unwrap().unwrap().0, text);
	}

	#[test]
	fn test_display() {
		let instruction = Instruction {
			offset: 0x12,
			opcode: 0x1050,
			operands: Operands::Ints(vec![2]),
		};
		assert_eq!(instruction.to_string(), "0012: SELECT_BMP   2");
		let unknown = Instruction {
			offset: 0,
			opcode: 0x1300,
			operands: Operands::Ints(vec![72, 1]),
		};
		assert_eq!(unknown.to_string(), "0000: OP_1300      72, 1");
	}
}
