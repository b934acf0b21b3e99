#[doc(inline)]
pub use crate::{
	ads::{AdsOp, AdsState},
	config::PlaybackConfig,
	context::PlaybackContext,
	error::ScriptError,
	host::{Host, NullHost},
	interpreter::{Interpreter, Step},
	player::{PlaybackReport, Player},
	surface::{Rect, Surface},
	ttm::{Instruction, Op, Operands, TtmState},
};
