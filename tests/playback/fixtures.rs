//! Resource files and archives shared by the integration tests.

use dgds_rs::dgds_script::ttm::opcode::code;
use dgds_rs::dgds_script::ttm::{Instruction, Operands};
use dgds_rs::dgds_types::file::chunk::ChunkBuilder;
use dgds_rs::dgds_types::file::codec::Compression;
use dgds_rs::prelude::*;

pub(crate) fn ints(opcode: u16, values: &[i16]) -> Vec<u8> {
	Instruction {
		offset: 0,
		opcode,
		operands: Operands::Ints(values.to_vec()),
	}
	.to_bytes()
}

pub(crate) fn text(opcode: u16, value: &str) -> Vec<u8> {
	Instruction {
		offset: 0,
		opcode,
		operands: Operands::Text(value.to_string()),
	}
	.to_bytes()
}

fn strings(entries: &[(u16, &str)]) -> Vec<u8> {
	let mut table = StringTable::default();
	for &(index, value) in entries {
		table.insert(index, value);
	}
	table.to_bytes()
}

/// Palette with colour 1 set to VGA (63, 0, 0).
pub(crate) fn palette_file() -> Vec<u8> {
	let mut vga = vec![0u8; Palette::VGA_BYTES];
	vga[3] = 63;
	ChunkBuilder::new().container(ChunkTag::PAL, ChunkBuilder::new().leaf(ChunkTag::VGA, &vga)).build()
}

/// One 2x2 tile of colour 1.
pub(crate) fn bitmap_file() -> Vec<u8> {
	let inf = [1u16, 2, 2].iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<_>>();
	ChunkBuilder::new()
		.container(
			ChunkTag::BMP,
			ChunkBuilder::new()
				.leaf(ChunkTag::INF, &inf)
				.packed_leaf(ChunkTag::BIN, Compression::Rle, &[0x11, 0x11])
				.packed_leaf(ChunkTag::VGA, Compression::Lzw, &[0x00, 0x00]),
		)
		.build()
}

/// A scene that fades in, then draws the tile one column further right per frame.
pub(crate) fn walk_scene() -> Vec<u8> {
	let mut code = vec![
		text(code::LOAD_PALETTE, "GAME.PAL"),
		text(code::LOAD_BITMAP, "HERO.BMP"),
		ints(code::SET_BITMAP, &[0]),
		ints(code::FADE_IN, &[]),
	];
	for step in 0..4 {
		code.push(ints(code::SET_SCENE, &[step + 1]));
		code.push(ints(code::DRAW_BITMAP, &[step * 10, 100]));
		code.push(ints(code::SET_DELAY, &[1]));
		code.push(ints(code::REFRESH, &[]));
	}
	code.push(ints(code::FINISH, &[]));
	let code = code.concat();

	ChunkBuilder::new()
		.leaf(ChunkTag::VER, b"4.09\0")
		.leaf(ChunkTag::PAG, &1u16.to_le_bytes())
		.packed_leaf(ChunkTag::TT3, Compression::Lzw, &code)
		.leaf(ChunkTag::TAG, &strings(&[(1, "WALK")]))
		.build()
}

/// A sequence that plays the walk scene up to scene id 2, then to the end.
pub(crate) fn intro_sequence() -> Vec<u8> {
	let code = [
		0x05, 0x20, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, // scene 1 up to 2
		0x05, 0x20, 0x01, 0x00, 0x63, 0x00, 0x00, 0x00, 0x00, 0x00, // scene 1 to the end
		0xFF, 0xFF,
	];
	ChunkBuilder::new()
		.leaf(ChunkTag::VER, b"4.09\0")
		.leaf(ChunkTag::RES, &strings(&[(1, "WALK.TTM")]))
		.packed_leaf(ChunkTag::SCR, Compression::Rle, &code)
		.leaf(ChunkTag::TAG, &strings(&[(1, "INTRO")]))
		.build()
}

pub(crate) fn archive_builder() -> ArchiveBuilder {
	ArchiveBuilder::new([0xDE, 0xAD, 0xBE, 0xEF])
		.volume("RESOURCE.001")
		.file("GAME.PAL", palette_file())
		.file("HERO.BMP", bitmap_file())
		.volume("RESOURCE.002")
		.file("WALK.TTM", walk_scene())
		.file("INTRO.ADS", intro_sequence())
		.tombstone("OLD.TTM")
}
