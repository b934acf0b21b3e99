//! On-disk archive access.

use dgds_rs::prelude::*;

use crate::fixtures;

#[test_log::test]
fn test_open_from_disk() {
	let dir = tempfile::tempdir().unwrap();
	let index = fixtures::archive_builder().write_to(dir.path(), "RESOURCE.MAP").unwrap();
	let archive = Archive::open(&index).unwrap();

	assert_eq!(archive.volume_name(1), Some("RESOURCE.002"));
	assert_eq!(archive.read_file("game.pal").unwrap(), Some(fixtures::palette_file()));
	assert_eq!(archive.read_file("WALK.TTM").unwrap(), Some(fixtures::walk_scene()));
	assert_eq!(archive.read_file("OLD.TTM").unwrap(), None);
	assert_eq!(archive.read_file("NOSUCH.BMP").unwrap(), None);

	let names: Vec<_> = archive.entries().unwrap().into_iter().map(|e| e.name).collect();
	assert_eq!(names, ["GAME.PAL", "HERO.BMP", "WALK.TTM", "INTRO.ADS"]);
}

#[test_log::test]
fn test_missing_volume_reads_as_absent() {
	let dir = tempfile::tempdir().unwrap();
	let index = fixtures::archive_builder().write_to(dir.path(), "RESOURCE.MAP").unwrap();
	std::fs::remove_file(dir.path().join("RESOURCE.002")).unwrap();

	let archive = Archive::open(&index).unwrap();
	assert!(archive.read_file("GAME.PAL").unwrap().is_some());
	assert_eq!(archive.read_file("WALK.TTM").unwrap(), None);
}

#[test]
fn test_typed_loading_from_disk() {
	let dir = tempfile::tempdir().unwrap();
	let index = fixtures::archive_builder().write_to(dir.path(), "RESOURCE.MAP").unwrap();
	let loader = ResourceLoader::new(Archive::open(&index).unwrap());

	let palette = loader.load_palette("GAME.PAL").unwrap().unwrap();
	assert_eq!(palette[1], Color::new(252, 0, 0));

	let tile = loader.load_bitmaps("HERO.BMP").unwrap().unwrap().tile(0).unwrap().unwrap();
	assert_eq!(tile.pixels(), &[1, 1, 1, 1]);

	let ads = loader.load_sequence_script("INTRO.ADS").unwrap().unwrap();
	assert_eq!(ads.scenes.len(), 1);
	assert_eq!(ads.scene(1).map(|ttm| ttm.pages), Some(1));
}
