//! Scene script execution.

use log::{debug, trace, warn};

use dgds_types::file::{Palette, ResourceLoader, TtmData};

use crate::context::{PlaybackContext, slot_index};
use crate::host::Host;
use crate::surface::Rect;
use crate::ttm::{Instruction, Op, Status, TtmState};

/// Instructions executed per run call before control returns to the host.
pub const DEFAULT_MAX_STEPS: usize = 4096;

/// Outcome of a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	/// Keep going
	Continue,
	/// The visible frame changed; hand control back
	Yield,
	/// The script ended
	Halt,
}

/// Executes scripts against a playback context.
///
/// The interpreter borrows everything it touches, so a host can keep one context
/// across many scripts and frames.
pub struct Interpreter<'a> {
	pub(crate) context: &'a mut PlaybackContext,
	pub(crate) loader: &'a ResourceLoader,
	pub(crate) host: &'a mut dyn Host,
	pub(crate) max_steps: usize,
}

impl<'a> Interpreter<'a> {
	/// Creates an interpreter with the default step bound.
	pub fn new(context: &'a mut PlaybackContext, loader: &'a ResourceLoader, host: &'a mut dyn Host) -> Self {
		Self {
			context,
			loader,
			host,
			max_steps: DEFAULT_MAX_STEPS,
		}
	}

	/// Bounds the instructions executed per run call.
	pub fn with_max_steps(mut self, max_steps: usize) -> Self {
		self.max_steps = max_steps.max(1);
		self
	}

	/// Runs `ttm` until it yields a frame or ends.
	///
	/// Returns `false` once the script has finished.
	pub fn run_scene(&mut self, ttm: &TtmData, state: &mut TtmState) -> bool {
		if state.is_halted() {
			return false;
		}
		state.status = Status::Running;
		for _ in 0..self.max_steps {
			match self.step_scene(ttm, state) {
				Step::Continue => {}
				Step::Yield => return true,
				Step::Halt => return false,
			}
		}
		debug!("{}: step bound reached at {}", ttm.name, state.position);
		true
	}

	/// Executes one instruction of `ttm`.
	pub fn step_scene(&mut self, ttm: &TtmData, state: &mut TtmState) -> Step {
		if state.is_halted() {
			return Step::Halt;
		}
		let (instruction, next) = match Instruction::decode(&ttm.code, state.position) {
			Ok(Some(decoded)) => decoded,
			Ok(None) => {
				trace!("{}: end of script", ttm.name);
				state.status = Status::Halted;
				return Step::Halt;
			}
			Err(err) => {
				warn!("{}: truncated instruction at {}: {err}", ttm.name, state.position);
				state.status = Status::Halted;
				return Step::Halt;
			}
		};
		trace!("{}: {instruction}", ttm.name);
		state.position = next;

		let step = self.execute(Op::from_instruction(&instruction), state);
		if step == Step::Halt {
			state.status = Status::Halted;
		}
		step
	}

	fn execute(&mut self, op: Op, state: &mut TtmState) -> Step {
		let step = if op.yields() {
			Step::Yield
		} else {
			Step::Continue
		};
		match op {
			Op::Finish => return Step::Halt,
			Op::SaveBackground => {
				let context = &mut *self.context;
				context.background.copy_from(&context.overlay);
			}
			Op::PurgeImages => self.context.purge_images(),
			Op::Refresh => {
				let window = self.context.bitmap_window;
				self.context.compose(window);
				self.context.overlay.fill_rect(window, 0);
			}
			Op::SetDelay(ticks) => {
				state.delay = state.delay.saturating_add(u32::from(ticks.max(0).unsigned_abs()) * 10);
			}
			Op::SetBitmap(tile) => self.select_tile(tile),
			Op::SelectBitmap(slot) => {
				if let Some(slot) = self.slot(slot, "bitmap") {
					self.context.bitmap_slot = slot;
				}
			}
			Op::SelectScreen(slot) => {
				if let Some(slot) = self.slot(slot, "screen") {
					self.context.screen_slot = slot;
				}
			}
			Op::SelectSong(slot) => {
				if let Some(slot) = self.slot(slot, "song") {
					self.context.song_slot = slot;
				}
			}
			Op::SetScene(scene) => {
				trace!("scene {scene}");
				state.scene = scene;
			}
			Op::SetClipWindow {
				x0,
				y0,
				x1,
				y1,
			} => {
				self.context.clip_window = Rect::new(x0.into(), y0.into(), x1.into(), y1.into());
			}
			Op::FadeOut => {
				let black = Palette::black();
				self.host.set_palette(&black);
				self.context.applied_palette = black;
				self.context.background.fill(0);
			}
			Op::FadeIn => {
				self.host.set_palette(&self.context.palette);
				self.context.applied_palette = self.context.palette.clone();
			}
			Op::StoreArea {
				x,
				y,
				width,
				height,
			} => {
				let area = Rect::with_size(x.into(), y.into(), width.into(), height.into());
				let context = &mut *self.context;
				context.compose(Rect::screen());
				context.background.copy_rect(&context.frame, area);
			}
			Op::SetBitmapWindow {
				x,
				y,
				width,
				height,
			} => {
				self.context.bitmap_window = Rect::with_size(x.into(), y.into(), width.into(), height.into());
			}
			Op::BlendLayers => {
				let context = &mut *self.context;
				context.compose(Rect::screen());
				context.overlay.copy_from(&context.frame);
			}
			Op::DrawBitmap {
				x,
				y,
				select,
			} => {
				if let Some((tile, slot)) = select {
					if let Some(slot) = self.slot(slot, "bitmap") {
						self.context.bitmap_slot = slot;
					}
					self.select_tile(tile);
				}
				let context = &mut *self.context;
				if let Some(bitmap) = &context.current {
					context.overlay.draw_bitmap(bitmap, x.into(), y.into(), context.clip_window);
				} else {
					trace!("draw at ({x}, {y}) without a bitmap");
				}
			}
			Op::LoadScreen(name) => self.load_screen(name),
			Op::LoadBitmap(name) => {
				let slot = &mut self.context.bitmaps[self.context.bitmap_slot];
				slot.name = Some(name);
				slot.set = None;
			}
			Op::LoadPalette(name) => match self.loader.load_palette(&name) {
				Ok(Some(palette)) => self.context.palette = palette,
				Ok(None) => {}
				Err(err) => warn!("{name}: {err}"),
			},
			Op::LoadSong(name) => self.load_song(name),
			Op::DrawBackground | Op::SetPaletteSlot(_) | Op::SetFrame(..) | Op::DrawBitmapRadial { .. } => {
				debug!("unimplemented operation {op:?}");
			}
			Op::Unhandled {
				opcode,
				operands,
			} => {
				debug!("unhandled opcode 0x{opcode:04X} {operands:?}");
			}
		}
		step
	}

	fn slot(&self, value: i16, kind: &str) -> Option<usize> {
		let slot = slot_index(value);
		if slot.is_none() {
			warn!("{kind} slot {value} out of range");
		}
		slot
	}

	/// Decodes tile `tile` of the selected bitmap slot into the current bitmap.
	fn select_tile(&mut self, tile: i16) {
		let context = &mut *self.context;
		context.current = None;
		let Ok(tile) = u16::try_from(tile) else {
			context.tile = None;
			return;
		};
		context.tile = Some(tile);

		let slot = &mut context.bitmaps[context.bitmap_slot];
		let Some(name) = slot.name.as_deref() else {
			debug!("bitmap slot {} is empty", context.bitmap_slot);
			return;
		};
		if slot.set.is_none() {
			match self.loader.load_bitmaps(name) {
				Ok(set) => slot.set = set,
				Err(err) => warn!("{name}: {err}"),
			}
		}
		let Some(set) = &slot.set else {
			return;
		};
		match set.tile(usize::from(tile)) {
			Ok(Some(bitmap)) => context.current = Some(bitmap),
			Ok(None) => warn!("{name}: no tile {tile}"),
			Err(err) => warn!("{name}: tile {tile}: {err}"),
		}
	}

	fn load_screen(&mut self, name: String) {
		match self.loader.load_screen(&name) {
			Ok(Some(image)) => self.context.background.load_image(&image),
			Ok(None) => {}
			Err(err) => warn!("{name}: {err}"),
		}
		self.context.screens[self.context.screen_slot] = Some(name);
	}

	fn load_song(&mut self, name: String) {
		match self.loader.load_song(&name) {
			Ok(Some(bank)) => {
				if let Some(song) = bank.song(0) {
					self.host.play_music(song);
				}
			}
			Ok(None) => {}
			Err(err) => warn!("{name}: {err}"),
		}
		self.context.songs[self.context.song_slot] = Some(name);
	}
}
