//! DGDS Script CLI Utility
//!
//! Disassembles scene (TTM) and sequence (ADS) scripts and plays them headless.
//!
//! # Usage
//!
//! ```bash
//! # Print every instruction of a scene script
//! cargo run --example script_utils -- disasm game/RESOURCE.MAP TITLE.TTM
//!
//! # Print a sequence script together with the scenes it loads
//! cargo run --example script_utils -- disasm game/RESOURCE.MAP INTRO.ADS --scenes
//!
//! # Run a script without a display and report the frame count
//! cargo run --example script_utils -- play game/RESOURCE.MAP INTRO.ADS --max-frames 2000
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dgds_rs::dgds_script::{ads, ttm};
use dgds_rs::prelude::*;
use log::info;

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();
	match cli.command {
		Command::Disasm(args) => run_disasm(args),
		Command::Play(args) => run_play(args),
	}
}

#[derive(Parser)]
#[command(name = "script_utils")]
#[command(author = "dgds-rs project")]
#[command(version)]
#[command(about = "Disassemble and play DGDS scene and sequence scripts", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Disassemble a TTM or ADS script
	Disasm(DisasmArgs),
	/// Play a script headless and report what happened
	Play(PlayArgs),
}

#[derive(Args)]
struct DisasmArgs {
	/// Index file
	#[arg(value_name = "INDEX")]
	index: PathBuf,

	/// Script file inside the archive
	#[arg(value_name = "SCRIPT")]
	script: String,

	/// Also disassemble the scenes a sequence script references
	#[arg(short, long, default_value_t = false)]
	scenes: bool,
}

#[derive(Args)]
struct PlayArgs {
	/// Index file
	#[arg(value_name = "INDEX")]
	index: PathBuf,

	/// Script file inside the archive
	#[arg(value_name = "SCRIPT")]
	script: String,

	/// Playback configuration file (TOML)
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Stop after this many frames
	#[arg(long, value_name = "COUNT", default_value_t = 10_000)]
	max_frames: usize,

	/// Sleep between frames as the game would
	#[arg(long, default_value_t = false)]
	realtime: bool,
}

fn loader(index: &Path, config: &PlaybackConfig) -> Result<ResourceLoader> {
	let archive = Archive::open(index).with_context(|| format!("Failed to open archive {}", index.display()))?;
	Ok(config.loader(archive)?)
}

fn print_scene(ttm: &TtmData) -> Result<()> {
	println!("; {} version {:?}, {} pages, {} bytes", ttm.name, ttm.version, ttm.pages, ttm.code.len());
	for (id, tag) in ttm.tags.iter() {
		println!(";   tag {id}: {tag}");
	}
	for instruction in ttm::disassemble(&ttm.code)? {
		println!("{instruction}");
	}
	Ok(())
}

fn run_disasm(args: DisasmArgs) -> Result<()> {
	let loader = loader(&args.index, &PlaybackConfig::default())?;
	match Extension::from_filename(&args.script) {
		Some(Extension::TTM) => {
			let ttm = loader.load_scene_script(&args.script)?.context("Script not found")?;
			print_scene(&ttm)?;
		}
		Some(Extension::ADS | Extension::ADL | Extension::ADH) => {
			let ads = loader.load_sequence_script(&args.script)?.context("Script not found")?;
			println!("; {} version {:?}, {} bytes", ads.name, ads.version, ads.code.len());
			for (id, name) in ads.resources.iter() {
				println!(";   scene {id}: {name}");
			}
			for (offset, op) in ads::disassemble(&ads.code)? {
				println!("{offset:04X}: {op}");
			}
			if args.scenes {
				for ttm in ads.scenes.values() {
					println!();
					print_scene(ttm)?;
				}
			}
		}
		_ => bail!("{} is not a script file", args.script),
	}
	Ok(())
}

fn run_play(args: PlayArgs) -> Result<()> {
	let mut config = match &args.config {
		Some(path) => PlaybackConfig::load(path)?,
		None => PlaybackConfig::default(),
	};
	if !args.realtime {
		config.frame_delay_ms = 0;
	}
	config.max_frames = Some(args.max_frames);

	let loader = loader(&args.index, &config)?;
	let mut player = Player::new(loader, HeadlessHost::new(args.realtime), config);
	let report = player.play(&args.script)?;

	let host = player.host();
	info!(
		"{}: {} frames, {} palette changes, {} songs, {:.1}s of script time",
		args.script,
		report.frames,
		host.palettes,
		host.songs,
		host.waited.as_secs_f64()
	);
	if !report.completed {
		info!("stopped at the frame limit");
	}
	Ok(())
}

/// Counts what a display would have shown.
struct HeadlessHost {
	realtime: bool,
	palettes: usize,
	songs: usize,
	waited: std::time::Duration,
}

impl HeadlessHost {
	fn new(realtime: bool) -> Self {
		Self {
			realtime,
			palettes: 0,
			songs: 0,
			waited: std::time::Duration::ZERO,
		}
	}
}

impl Host for HeadlessHost {
	fn set_palette(&mut self, _palette: &Palette) {
		self.palettes += 1;
	}

	fn play_music(&mut self, _song: &[u8]) {
		self.songs += 1;
	}

	fn wait(&mut self, duration: std::time::Duration) {
		self.waited += duration;
		if self.realtime {
			std::thread::sleep(duration);
		}
	}
}
