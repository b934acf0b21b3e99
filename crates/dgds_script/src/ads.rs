//! Sequence scripts (ADS).
//!
//! A sequence script is a flat stream of `u16` words. Words below `0x0100` push a
//! tag reference and are skipped during playback. [`PLAY_SCENE`] is followed by a
//! resource id, a scene-id bound and two words with no known meaning: the named
//! scene script runs until it marks a scene at or past the bound, then the sequence
//! resumes. [`RETURN`] ends the sequence.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use log::{debug, trace, warn};

use dgds_types::file::reader::ByteReader;
use dgds_types::file::{AdsData, DgdsError, FileType};

use crate::interpreter::Interpreter;
use crate::ttm::{Status, TtmState};

/// Activates a scene script.
pub const PLAY_SCENE: u16 = 0x2005;

/// Ends the sequence.
pub const RETURN: u16 = 0xFFFF;

/// One sequence operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsOp {
	/// Tag reference
	Push(u16),
	/// Run scene `child` until its scene id reaches `max_scene`
	PlayScene {
		/// Resource id of the scene script
		child: u16,
		/// Scene-id bound
		max_scene: u16,
		/// Trailing operands, kept for disassembly
		extra: [u16; 2],
	},
	/// End of sequence
	Return,
	/// Opcode without a handler
	Unhandled(u16),
}

impl AdsOp {
	/// Decodes the operation at `offset`, or `None` at the end of the script.
	pub fn decode(code: &[u8], offset: usize) -> Result<Option<(Self, usize)>, DgdsError> {
		let mut reader = ByteReader::new(code, FileType::SequenceScript);
		reader.seek(offset)?;
		if reader.is_empty() {
			return Ok(None);
		}
		let word = reader.read_u16_le()?;
		let op = match word {
			_ if word & 0xFF00 == 0 => Self::Push(word),
			PLAY_SCENE => Self::PlayScene {
				child: reader.read_u16_le()?,
				max_scene: reader.read_u16_le()?,
				extra: [reader.read_u16_le()?, reader.read_u16_le()?],
			},
			RETURN => Self::Return,
			other => Self::Unhandled(other),
		};
		Ok(Some((op, reader.position())))
	}
}

impl fmt::Display for AdsOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Push(tag) => write!(f, "PUSH        {tag}"),
			Self::PlayScene {
				child,
				max_scene,
				extra: [a, b],
			} => write!(f, "PLAY_SCENE  {child}, {max_scene}, {a}, {b}"),
			Self::Return => f.write_str("RETURN"),
			Self::Unhandled(code) => write!(f, "OP_{code:04X}"),
		}
	}
}

/// Decodes every operation of a sequence script with its offset.
pub fn disassemble(code: &[u8]) -> Result<Vec<(usize, AdsOp)>, DgdsError> {
	let mut ops = Vec::new();
	let mut offset = 0;
	while let Some((op, next)) = AdsOp::decode(code, offset)? {
		ops.push((offset, op));
		offset = next;
	}
	Ok(ops)
}

/// The scene a sequence is currently delegating to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveScene {
	/// Resource id of the scene script
	pub child: u16,
	/// Scene-id bound
	pub max_scene: u16,
}

/// Mutable cursor of one sequence script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdsState {
	/// Offset of the next operation
	pub position: usize,
	/// Scene being delegated to
	pub active: Option<ActiveScene>,
	/// Scene states keyed by resource id
	pub children: BTreeMap<u16, TtmState>,
	/// Lifecycle
	pub status: Status,
}

impl AdsState {
	/// A state positioned at the start of the script.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether the sequence has finished.
	pub fn is_halted(&self) -> bool {
		self.status == Status::Halted
	}

	/// Returns and clears the delay accumulated by every scene.
	pub fn take_delay(&mut self) -> Duration {
		self.children.values_mut().map(TtmState::take_delay).sum()
	}
}

impl Interpreter<'_> {
	/// Runs one step of `ads`: either one run of the active scene or sequence
	/// operations up to the next scene activation.
	///
	/// Returns `false` once the sequence has finished.
	pub fn run_sequence(&mut self, ads: &AdsData, state: &mut AdsState) -> bool {
		if state.is_halted() {
			return false;
		}
		state.status = Status::Running;

		if let Some(active) = state.active {
			let child = state.children.entry(active.child).or_default();
			let running = match ads.scene(active.child) {
				Some(ttm) => self.run_scene(ttm, child),
				None => false,
			};
			if !running || i32::from(child.scene) >= i32::from(active.max_scene) {
				debug!("{}: scene {} done at scene id {}", ads.name, active.child, child.scene);
				state.active = None;
			}
			return true;
		}

		for _ in 0..self.max_steps {
			let (op, next) = match AdsOp::decode(&ads.code, state.position) {
				Ok(Some(decoded)) => decoded,
				Ok(None) => {
					trace!("{}: end of sequence", ads.name);
					state.status = Status::Halted;
					return false;
				}
				Err(err) => {
					warn!("{}: truncated operation at {}: {err}", ads.name, state.position);
					state.status = Status::Halted;
					return false;
				}
			};
			trace!("{}: {:04X}: {op}", ads.name, state.position);
			state.position = next;

			match op {
				AdsOp::Push(_) => {}
				AdsOp::Return => {
					state.status = Status::Halted;
					return false;
				}
				AdsOp::PlayScene {
					child,
					max_scene,
					..
				} => {
					if ads.scene(child).is_none() {
						warn!("{}: scene {child} is not loaded", ads.name);
						continue;
					}
					let scene = state.children.entry(child).or_default();
					if scene.is_halted() {
						scene.reset();
					}
					state.active = Some(ActiveScene {
						child,
						max_scene,
					});
					return true;
				}
				AdsOp::Unhandled(code) => debug!("{}: unhandled opcode 0x{code:04X}", ads.name),
			}
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_stream() {
		let code = [
			0x07, 0x00, 0x05, 0x20, 0x01, 0x00, 0x03, 0x00, 0x04, 0x00, 0x00, 0x00, 0x50, 0x13, 0xFF, 0xFF,
		];
		let ops = disassemble(&code).unwrap();
		assert_eq!(
			ops,
			[
				(0, AdsOp::Push(7)),
				(
					2,
					AdsOp::PlayScene {
						child: 1,
						max_scene: 3,
						extra: [4, 0],
					}
				),
				(12, AdsOp::Unhandled(0x1350)),
				(14, AdsOp::Return),
			]
		);
		assert_eq!(ops[1].1.to_string(), "PLAY_SCENE  1, 3, 4, 0");
	}

	#[test]
	fn test_play_scene_operands_are_not_opcodes() {
		// Both trailing operands read as RETURN if taken for opcodes
		let code = [0x05, 0x20, 0x02, 0x00, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00];
		let ops = disassemble(&code).unwrap();
		assert_eq!(
			ops,
			[
				(
					0,
					AdsOp::PlayScene {
						child: 2,
						max_scene: 5,
						extra: [0xFFFF, 0xFFFF],
					}
				),
				(10, AdsOp::Push(7)),
			]
		);
	}

	#[test]
	fn test_truncated_play_scene() {
		assert!(AdsOp::decode(&[0x05, 0x20, 0x01, 0x00, 0x03, 0x00], 0).is_err());
	}
}
