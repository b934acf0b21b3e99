//! DGDS Resource Archive CLI Utility
//!
//! A command-line tool for inspecting index/volume archives and the resources
//! stored in them.
//!
//! # Features
//!
//! - **info**: Display index salt, volumes and file counts
//! - **list**: List every stored file, optionally filtered by a regex
//! - **extract**: Write raw files out of the archive
//! - **dump**: Decode every chunk of every file; palettes, bitmaps and screens
//!   become PNG images
//! - **hash**: Compute the salted name hash used by the index
//!
//! # Usage
//!
//! ```bash
//! cargo run --example archive_utils -- info game/RESOURCE.MAP
//! cargo run --example archive_utils -- list game/RESOURCE.MAP --filter '\.TTM$' --format json
//! cargo run --example archive_utils -- extract game/RESOURCE.MAP INTRO.ADS -o out/
//! cargo run --example archive_utils -- dump game/RESOURCE.MAP -o dump/ --palette DYNAMIX.PAL
//! cargo run --example archive_utils -- hash INTRO.ADS --index game/RESOURCE.MAP
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dgds_rs::prelude::*;
use dgds_rs::dgds_types::file::archive::{IndexFile, Salt, dgds_hash};
use dgds_rs::dgds_types::file::resource::{DecodedChunk, FlatFile};
use image::RgbImage;
use log::{debug, info, trace, warn};
use regex::RegexBuilder;

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();
	match cli.command {
		Command::Info(args) => run_info(args),
		Command::List(args) => run_list(args),
		Command::Extract(args) => run_extract(args),
		Command::Dump(args) => run_dump(args),
		Command::Hash(args) => run_hash(args),
	}
}

#[derive(Parser)]
#[command(name = "archive_utils")]
#[command(author = "dgds-rs project")]
#[command(version)]
#[command(about = "DGDS resource archive utility - inspect, extract and dump", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Display index and volume information
	Info(InfoArgs),
	/// List all files in the archive
	List(ListArgs),
	/// Extract raw files
	Extract(ExtractArgs),
	/// Decode every chunk of every file into a directory
	Dump(DumpArgs),
	/// Compute the index hash of a file name
	Hash(HashArgs),
}

#[derive(Args)]
struct InfoArgs {
	/// Index file (usually RESOURCE.MAP or VOLUME.VGA)
	#[arg(value_name = "INDEX")]
	index: PathBuf,
}

#[derive(Args)]
struct ListArgs {
	/// Index file
	#[arg(value_name = "INDEX")]
	index: PathBuf,

	/// Filter by name pattern (case-insensitive regex)
	#[arg(short = 'p', long, value_name = "PATTERN")]
	filter: Option<String>,

	/// Output format
	#[arg(short, long, value_enum, default_value = "table")]
	format: OutputFormat,
}

#[derive(Args)]
struct ExtractArgs {
	/// Index file
	#[arg(value_name = "INDEX")]
	index: PathBuf,

	/// Files to extract
	#[arg(value_name = "FILES")]
	files: Vec<String>,

	/// Extract every file
	#[arg(short, long, default_value_t = false)]
	all: bool,

	/// Output directory
	#[arg(short, long, value_name = "DIR", default_value = "extract")]
	output: PathBuf,
}

#[derive(Args)]
struct DumpArgs {
	/// Index file
	#[arg(value_name = "INDEX")]
	index: PathBuf,

	/// Output directory
	#[arg(short, long, value_name = "DIR", default_value = "dump")]
	output: PathBuf,

	/// Only dump files matching this pattern (case-insensitive regex)
	#[arg(short = 'p', long, value_name = "PATTERN")]
	filter: Option<String>,

	/// Palette file used to colour bitmaps and screens (greyscale otherwise)
	#[arg(long, value_name = "PAL")]
	palette: Option<String>,

	/// Game platform, selects which files are unframed
	#[arg(long, value_enum, default_value = "dos")]
	platform: PlatformArg,

	/// Trace a hexdump of every chunk payload
	#[arg(long, default_value_t = false)]
	hexdump: bool,
}

#[derive(Args)]
struct HashArgs {
	/// File names to hash
	#[arg(value_name = "NAMES", required = true)]
	names: Vec<String>,

	/// Salt as 8 hex digits
	#[arg(short, long, value_name = "HEX", conflicts_with = "index")]
	salt: Option<String>,

	/// Read the salt from this index file
	#[arg(short, long, value_name = "INDEX")]
	index: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
	/// Table format
	Table,
	/// JSON format
	Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
	Dos,
	Amiga,
	Mac,
}

impl From<PlatformArg> for Platform {
	fn from(value: PlatformArg) -> Self {
		match value {
			PlatformArg::Dos => Platform::Dos,
			PlatformArg::Amiga => Platform::Amiga,
			PlatformArg::Mac => Platform::Macintosh,
		}
	}
}

fn open_archive(path: &Path) -> Result<Archive> {
	Archive::open(path).with_context(|| format!("Failed to open archive {}", path.display()))
}

fn name_filter(pattern: Option<&str>) -> Result<Option<regex::Regex>> {
	pattern
		.map(|p| RegexBuilder::new(p).case_insensitive(true).build())
		.transpose()
		.context("Invalid filter pattern")
}

fn run_info(args: InfoArgs) -> Result<()> {
	let archive = open_archive(&args.index)?;
	let index = archive.index();
	println!("Index:   {}", args.index.display());
	println!("Salt:    {}", hex::encode_upper(index.salt));
	println!("Volumes: {}", index.volumes.len());
	for volume in &index.volumes {
		println!("  {:<13} {:>5} slots", volume.name, volume.entries.len());
	}

	let entries = archive.entries()?;
	let total: u64 = entries.iter().map(|e| u64::from(e.length)).sum();
	let mismatched = entries.iter().filter(|e| !e.hash_matches()).count();
	println!("Files:   {} live of {} slots, {total} bytes", entries.len(), index.file_count());
	if mismatched > 0 {
		println!("Hashes:  {mismatched} stored hashes disagree with their names");
	}
	Ok(())
}

fn run_list(args: ListArgs) -> Result<()> {
	let archive = open_archive(&args.index)?;
	let filter = name_filter(args.filter.as_deref())?;
	let entries: Vec<_> = archive
		.entries()?
		.into_iter()
		.filter(|e| filter.as_ref().is_none_or(|f| f.is_match(&e.name)))
		.collect();

	match args.format {
		OutputFormat::Table => {
			println!("{:13} | {:13} | {:>10} | {:>8} | {:8}", "Name", "Volume", "Offset", "Size", "Hash");
			println!("{}", "-".repeat(64));
			for entry in &entries {
				let volume = archive.volume_name(entry.volume).unwrap_or("?");
				let flag = if entry.hash_matches() {
					""
				} else {
					" !"
				};
				println!(
					"{:13} | {:13} | {:>10} | {:>8} | {:08X}{flag}",
					entry.name, volume, entry.offset, entry.length, entry.stored_hash
				);
			}
			println!("\n{} files", entries.len());
		}
		OutputFormat::Json => {
			let json: Vec<_> = entries
				.iter()
				.map(|e| {
					serde_json::json!({
						"name": e.name,
						"volume": archive.volume_name(e.volume),
						"offset": e.offset,
						"size": e.length,
						"hash": format!("{:08X}", e.stored_hash),
						"hash_matches": e.hash_matches(),
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&json)?);
		}
	}
	Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
	if !args.all && args.files.is_empty() {
		bail!("Name at least one file or pass --all");
	}
	let archive = open_archive(&args.index)?;
	fs::create_dir_all(&args.output)?;

	let names: Vec<String> = if args.all {
		archive.entries()?.into_iter().map(|e| e.name).collect()
	} else {
		args.files
	};

	let mut missing = 0;
	for name in &names {
		match archive.read_file(name)? {
			Some(data) => {
				let path = args.output.join(name);
				fs::write(&path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
				info!("{name}: {} bytes", data.len());
			}
			None => {
				warn!("{name}: not in archive");
				missing += 1;
			}
		}
	}
	if missing > 0 {
		bail!("{missing} of {} files were not found", names.len());
	}
	Ok(())
}

fn greyscale() -> Palette {
	let mut palette = Palette::black();
	for i in 0..=255u8 {
		palette.set(i, Color::new(i, i, i));
	}
	palette
}

fn to_rgb(pixels: &[u8], width: u32, height: u32, palette: &Palette) -> Result<RgbImage> {
	let rgb = pixels.iter().flat_map(|&p| {
		let c = palette[p];
		[c.r, c.g, c.b]
	});
	RgbImage::from_raw(width, height, rgb.collect()).context("Pixel count does not match image size")
}

fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
	image.save(path).with_context(|| format!("Failed to save {}", path.display()))?;
	debug!("wrote {}", path.display());
	Ok(())
}

fn palette_swatch(palette: &Palette) -> Result<RgbImage> {
	const CELL: u32 = 8;
	let indices: Vec<u8> = (0..16 * CELL)
		.flat_map(|y| (0..16 * CELL).map(move |x| ((y / CELL) * 16 + x / CELL) as u8))
		.collect();
	to_rgb(&indices, 16 * CELL, 16 * CELL, palette)
}

struct Dumper {
	output: PathBuf,
	palette: Palette,
	hexdump: bool,
}

impl Dumper {
	fn dump_file(&self, file: &ResourceFile, data: &[u8]) -> Result<usize> {
		let dir = self.output.join(&file.name);
		fs::create_dir_all(&dir)?;

		if let Some(flat) = file.flat() {
			fs::write(dir.join("flat.txt"), format!("{flat:#?}"))?;
			if let FlatFile::Raw(bytes) = flat {
				fs::write(dir.join("raw.bin"), bytes)?;
			}
			return Ok(1);
		}

		for (i, chunk) in file.chunks().iter().enumerate() {
			self.dump_chunk(&dir, i, chunk)?;
		}

		let mut images = 0;
		if file.extension == Some(Extension::BMP) {
			let set = file.bitmap_set()?;
			for tile in 0..set.tile_count() {
				let Some(bitmap) = set.tile(tile)? else {
					continue;
				};
				if bitmap.is_empty() {
					continue;
				}
				let image = to_rgb(bitmap.pixels(), bitmap.width().into(), bitmap.height().into(), &self.palette)?;
				save_png(&dir.join(format!("tile{tile:03}.png")), &image)?;
				images += 1;
			}
		}
		if file.extension == Some(Extension::SCR) {
			match file.screen() {
				Ok(screen) => {
					let image = to_rgb(screen.pixels(), screen.width().into(), screen.height().into(), &self.palette)?;
					save_png(&dir.join("screen.png"), &image)?;
					images += 1;
				}
				Err(err) => warn!("{}: {err}", file.name),
			}
		}
		trace!("{}: {} bytes, {images} images", file.name, data.len());
		Ok(file.chunks().len())
	}

	fn dump_chunk(&self, dir: &Path, index: usize, chunk: &DecodedChunk) -> Result<()> {
		let stem = match chunk.parent {
			Some(parent) => format!("{index:03}.{parent}.{}", chunk.tag),
			None => format!("{index:03}.{}", chunk.tag),
		};
		let bytes: Option<&[u8]> = match &chunk.resource {
			Resource::Plane(bytes)
			| Resource::Code(bytes)
			| Resource::Song(bytes)
			| Resource::Blob(bytes) => Some(bytes),
			_ => None,
		};
		if self.hexdump && let Some(bytes) = bytes {
			let shown = &bytes[..bytes.len().min(64)];
			trace!("{stem}: {}", hex::encode(shown));
		}

		match &chunk.resource {
			Resource::Palette(palette) => save_png(&dir.join(format!("{stem}.png")), &palette_swatch(palette)?)?,
			Resource::Strings(table) => fs::write(dir.join(format!("{stem}.txt")), table.to_string())?,
			Resource::Version(version) => fs::write(dir.join(format!("{stem}.txt")), version)?,
			_ => match bytes {
				Some(bytes) => fs::write(dir.join(format!("{stem}.bin")), bytes)?,
				None => fs::write(dir.join(format!("{stem}.txt")), format!("{:#?}", chunk.resource))?,
			},
		}
		Ok(())
	}
}

fn run_dump(args: DumpArgs) -> Result<()> {
	let archive = open_archive(&args.index)?;
	let entries = archive.entries()?;
	let loader = ResourceLoader::new(archive).with_platform(args.platform.into());
	let filter = name_filter(args.filter.as_deref())?;

	let palette = match &args.palette {
		Some(name) => loader.load_palette(name)?.with_context(|| format!("Palette {name} not found"))?,
		None => greyscale(),
	};
	let dumper = Dumper {
		output: args.output,
		palette,
		hexdump: args.hexdump,
	};

	let (mut files, mut chunks, mut failed) = (0, 0, 0);
	for entry in entries.iter().filter(|e| filter.as_ref().is_none_or(|f| f.is_match(&e.name))) {
		let data = loader.archive().read(entry)?;
		let result = ResourceFile::parse(&entry.name, &data, loader.profiles(), loader.platform())
			.map_err(anyhow::Error::from)
			.and_then(|file| dumper.dump_file(&file, &data));
		match result {
			Ok(count) => {
				files += 1;
				chunks += count;
			}
			Err(err) => {
				warn!("{}: {err:#}", entry.name);
				failed += 1;
			}
		}
	}
	info!("dumped {chunks} chunks from {files} files into {}", dumper.output.display());
	if failed > 0 {
		warn!("{failed} files could not be decoded");
	}
	Ok(())
}

fn parse_salt(text: &str) -> Result<Salt> {
	let bytes = hex::decode(text).context("Salt must be hex")?;
	bytes.try_into().map_err(|_| anyhow::anyhow!("Salt must be exactly 4 bytes"))
}

fn run_hash(args: HashArgs) -> Result<()> {
	let salt = match (&args.salt, &args.index) {
		(Some(text), _) => parse_salt(text)?,
		(None, Some(path)) => IndexFile::open(path)?.salt,
		(None, None) => bail!("Pass --salt or --index"),
	};
	for name in &args.names {
		println!("{:08X}  {name}", dgds_hash(name, &salt));
	}
	Ok(())
}
