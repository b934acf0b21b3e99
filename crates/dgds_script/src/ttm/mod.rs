//! Scene scripts (TTM): instruction decoding, opcodes and execution state.

pub mod instruction;
pub mod opcode;

use std::time::Duration;

pub use instruction::{Instruction, Operands, disassemble};
pub use opcode::Op;

/// Lifecycle of a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
	/// Not started
	#[default]
	Ready,
	/// Started and not finished
	Running,
	/// Finished, or stopped on a malformed instruction
	Halted,
}

/// Mutable cursor of one scene script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TtmState {
	/// Offset of the next instruction
	pub position: usize,
	/// Scene id last marked by the script
	pub scene: i16,
	/// Delay accumulated since the last [`TtmState::take_delay`], in milliseconds
	pub delay: u32,
	/// Lifecycle
	pub status: Status,
}

impl TtmState {
	/// A state positioned at the start of the script.
	pub fn new() -> Self {
		Self::default()
	}

	/// Rewinds to the start.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Whether the script has finished.
	pub fn is_halted(&self) -> bool {
		self.status == Status::Halted
	}

	/// Returns and clears the accumulated delay.
	pub fn take_delay(&mut self) -> Duration {
		Duration::from_millis(u64::from(std::mem::take(&mut self.delay)))
	}
}
