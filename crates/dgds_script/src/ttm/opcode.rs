//! Scene script opcodes.

use super::instruction::{Instruction, Operands};

/// Opcode values.
pub mod code {
	/// End of scene
	pub const FINISH: u16 = 0x0000;
	/// Copy the overlay into the background
	pub const SAVE_BACKGROUND: u16 = 0x0020;
	/// Draw the background
	pub const DRAW_BACKGROUND: u16 = 0x0080;
	/// Drop decoded images
	pub const PURGE_IMAGES: u16 = 0x0110;
	/// Compose and show a frame
	pub const REFRESH: u16 = 0x0FF0;
	/// Add to the step delay
	pub const SET_DELAY: u16 = 0x1020;
	/// Select a tile of the current bitmap
	pub const SET_BITMAP: u16 = 0x1030;
	/// Select a bitmap slot
	pub const SELECT_BITMAP: u16 = 0x1050;
	/// Select a screen slot
	pub const SELECT_SCREEN: u16 = 0x1060;
	/// Select a song slot
	pub const SELECT_SONG: u16 = 0x1090;
	/// Select a palette slot
	pub const SET_PALETTE_SLOT: u16 = 0x10A0;
	/// Mark the current scene
	pub const SET_SCENE: u16 = 0x1110;
	/// Set frame counters
	pub const SET_FRAME: u16 = 0x2000;
	/// Set the drawing clip window
	pub const SET_CLIP_WINDOW: u16 = 0x4000;
	/// Fade to black
	pub const FADE_OUT: u16 = 0x4110;
	/// Apply the loaded palette
	pub const FADE_IN: u16 = 0x4120;
	/// Persist an area of the composed frame
	pub const STORE_AREA: u16 = 0x4200;
	/// Merge the overlay over the background
	pub const BLEND_LAYERS: u16 = 0xA050;
	/// Set the refresh window
	pub const SET_BITMAP_WINDOW: u16 = 0xA100;
	/// Draw the current tile
	pub const DRAW_BITMAP: u16 = 0xA500;
	/// Draw the current tile (alternate form)
	pub const DRAW_BITMAP_ALT: u16 = 0xA520;
	/// Draw a tile with radial symmetry
	pub const DRAW_BITMAP_RADIAL: u16 = 0xA530;
	/// Load a screen into the background
	pub const LOAD_SCREEN: u16 = 0xF010;
	/// Bind a bitmap file to the selected slot
	pub const LOAD_BITMAP: u16 = 0xF020;
	/// Load a palette
	pub const LOAD_PALETTE: u16 = 0xF050;
	/// Load and start a song
	pub const LOAD_SONG: u16 = 0xF060;
}

const MNEMONICS: &[(u16, &str)] = &[
	(code::FINISH, "FINISH"),
	(code::SAVE_BACKGROUND, "SAVE_BG"),
	(code::DRAW_BACKGROUND, "DRAW_BG"),
	(code::PURGE_IMAGES, "PURGE"),
	(code::REFRESH, "REFRESH"),
	(code::SET_DELAY, "DELAY"),
	(code::SET_BITMAP, "SET_BMP"),
	(code::SELECT_BITMAP, "SELECT_BMP"),
	(code::SELECT_SCREEN, "SELECT_SCR"),
	(code::SELECT_SONG, "SELECT_SONG"),
	(code::SET_PALETTE_SLOT, "SET_PAL"),
	(code::SET_SCENE, "SET_SCENE"),
	(code::SET_FRAME, "SET_FRAME"),
	(code::SET_CLIP_WINDOW, "SET_WINDOW"),
	(code::FADE_OUT, "FADE_OUT"),
	(code::FADE_IN, "FADE_IN"),
	(code::STORE_AREA, "STORE_AREA"),
	(code::BLEND_LAYERS, "BLEND"),
	(code::SET_BITMAP_WINDOW, "SET_BMP_WIN"),
	(code::DRAW_BITMAP, "DRAW_BMP"),
	(code::DRAW_BITMAP_ALT, "DRAW_BMP"),
	(code::DRAW_BITMAP_RADIAL, "DRAW_BMP4"),
	(code::LOAD_SCREEN, "LOAD_SCR"),
	(code::LOAD_BITMAP, "LOAD_BMP"),
	(code::LOAD_PALETTE, "LOAD_PAL"),
	(code::LOAD_SONG, "LOAD_SONG"),
];

/// Disassembler name of `opcode`.
pub fn mnemonic(opcode: u16) -> Option<&'static str> {
	MNEMONICS.iter().find(|(c, _)| *c == opcode).map(|(_, name)| *name)
}

/// A scene script operation with typed operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
	/// Stop the scene
	Finish,
	/// Copy the overlay into the background
	SaveBackground,
	/// Draw the background
	DrawBackground,
	/// Drop decoded images
	PurgeImages,
	/// Compose the frame and yield
	Refresh,
	/// Add `ticks * 10` ms to the delay
	SetDelay(i16),
	/// Select a tile of the selected bitmap; -1 clears
	SetBitmap(i16),
	/// Select a bitmap slot
	SelectBitmap(i16),
	/// Select a screen slot
	SelectScreen(i16),
	/// Select a song slot
	SelectSong(i16),
	/// Select a palette slot
	SetPaletteSlot(i16),
	/// Mark the current scene id
	SetScene(i16),
	/// Set frame counters
	SetFrame(i16, i16),
	/// Clip drawing to the corners `(x0, y0)`-`(x1, y1)`
	SetClipWindow {
		/// Left
		x0: i16,
		/// Top
		y0: i16,
		/// Right
		x1: i16,
		/// Bottom
		y1: i16,
	},
	/// Fade to black and clear the background
	FadeOut,
	/// Apply the loaded palette
	FadeIn,
	/// Persist an area of the composed frame into the background
	StoreArea {
		/// Left
		x: i16,
		/// Top
		y: i16,
		/// Width
		width: i16,
		/// Height
		height: i16,
	},
	/// Set the window refresh flushes
	SetBitmapWindow {
		/// Left
		x: i16,
		/// Top
		y: i16,
		/// Width
		width: i16,
		/// Height
		height: i16,
	},
	/// Merge the overlay over the background into the overlay
	BlendLayers,
	/// Draw the current tile, optionally selecting tile and slot first
	DrawBitmap {
		/// Left
		x: i16,
		/// Top
		y: i16,
		/// Tile and bitmap slot to select before drawing
		select: Option<(i16, i16)>,
	},
	/// Draw a tile several times around a centre
	DrawBitmapRadial {
		/// Left
		x: i16,
		/// Top
		y: i16,
	},
	/// Load a screen into the background
	LoadScreen(String),
	/// Bind a bitmap file to the selected slot
	LoadBitmap(String),
	/// Load a palette
	LoadPalette(String),
	/// Load a song and start it
	LoadSong(String),
	/// Opcode or operand shape with no handler
	Unhandled {
		/// Raw opcode
		opcode: u16,
		/// Raw operands
		operands: Operands,
	},
}

impl Op {
	/// Interprets a raw instruction.
	pub fn from_instruction(instruction: &Instruction) -> Self {
		let text = instruction.operands.text().map(str::to_owned);
		let op = match (instruction.opcode, instruction.operands.ints(), text) {
			(code::FINISH, [], None) => Some(Self::Finish),
			(code::SAVE_BACKGROUND, [], None) => Some(Self::SaveBackground),
			(code::DRAW_BACKGROUND, [], None) => Some(Self::DrawBackground),
			(code::PURGE_IMAGES, [], None) => Some(Self::PurgeImages),
			(code::REFRESH, [], None) => Some(Self::Refresh),
			(code::SET_DELAY, &[ticks], _) => Some(Self::SetDelay(ticks)),
			(code::SET_BITMAP, &[tile], _) => Some(Self::SetBitmap(tile)),
			(code::SELECT_BITMAP, &[slot], _) => Some(Self::SelectBitmap(slot)),
			(code::SELECT_SCREEN, &[slot], _) => Some(Self::SelectScreen(slot)),
			(code::SELECT_SONG, &[slot], _) => Some(Self::SelectSong(slot)),
			(code::SET_PALETTE_SLOT, &[slot], _) => Some(Self::SetPaletteSlot(slot)),
			(code::SET_SCENE, &[scene], _) => Some(Self::SetScene(scene)),
			(code::SET_FRAME, &[a, b], _) => Some(Self::SetFrame(a, b)),
			(code::SET_CLIP_WINDOW, &[x0, y0, x1, y1], _) => Some(Self::SetClipWindow {
				x0,
				y0,
				x1,
				y1,
			}),
			(code::FADE_OUT, _, None) => Some(Self::FadeOut),
			(code::FADE_IN, _, None) => Some(Self::FadeIn),
			(code::STORE_AREA, &[x, y, width, height], _) => Some(Self::StoreArea {
				x,
				y,
				width,
				height,
			}),
			(code::BLEND_LAYERS, _, None) => Some(Self::BlendLayers),
			(code::SET_BITMAP_WINDOW, &[x, y, width, height], _) => Some(Self::SetBitmapWindow {
				x,
				y,
				width,
				height,
			}),
			(code::DRAW_BITMAP | code::DRAW_BITMAP_ALT, &[x, y], _) => Some(Self::DrawBitmap {
				x,
				y,
				select: None,
			}),
			(code::DRAW_BITMAP | code::DRAW_BITMAP_ALT, &[x, y, tile, slot], _) => Some(Self::DrawBitmap {
				x,
				y,
				select: Some((tile, slot)),
			}),
			(code::DRAW_BITMAP_RADIAL, &[x, y, ..], _) => Some(Self::DrawBitmapRadial {
				x,
				y,
			}),
			(code::LOAD_SCREEN, _, Some(name)) => Some(Self::LoadScreen(name)),
			(code::LOAD_BITMAP, _, Some(name)) => Some(Self::LoadBitmap(name)),
			(code::LOAD_PALETTE, _, Some(name)) => Some(Self::LoadPalette(name)),
			(code::LOAD_SONG, _, Some(name)) => Some(Self::LoadSong(name)),
			_ => None,
		};
		op.unwrap_or_else(|| Self::Unhandled {
			opcode: instruction.opcode,
			operands: instruction.operands.clone(),
		})
	}

	/// Whether the operation changes what is visible and ends the current run.
	pub fn yields(&self) -> bool {
		matches!(self, Self::Refresh | Self::FadeIn | Self::FadeOut)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn op(opcode: u16, operands: Operands) -> Op {
		Op::from_instruction(&Instruction {
			offset: 0,
			opcode,
			operands,
		})
	}

	#[test]
	fn test_typed_operands() {
		assert_eq!(op(code::SET_DELAY, Operands::Ints(vec![5])), Op::SetDelay(5));
		assert_eq!(
			op(code::DRAW_BITMAP_ALT, Operands::Ints(vec![10, 20, 3, 1])),
			Op::DrawBitmap {
				x: 10,
				y: 20,
				select: Some((3, 1)),
			}
		);
		assert_eq!(op(code::LOAD_BITMAP, Operands::Text("A.BMP".into())), Op::LoadBitmap("A.BMP".into()));
		assert!(op(code::REFRESH, Operands::Ints(vec![])).yields());
	}

	#[test]
	fn test_unhandled() {
		assert!(matches!(op(0x1300, Operands::Ints(vec![72])), Op::Unhandled { opcode: 0x1300, .. }));
		// wrong operand shape
		assert!(matches!(op(code::SET_DELAY, Operands::Ints(vec![])), Op::Unhandled { .. }));
		assert!(matches!(op(code::LOAD_SCREEN, Operands::Ints(vec![1])), Op::Unhandled { .. }));
		assert_eq!(mnemonic(0x1300), None);
		assert_eq!(mnemonic(code::SELECT_BITMAP), Some("SELECT_BMP"));
	}
}
