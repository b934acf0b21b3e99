//! Script playback for the `dgds-rs` project.
//!
//! Scene scripts (TTM) draw into a [`PlaybackContext`]; sequence scripts (ADS)
//! decide which scene scripts run and for how long. An [`Interpreter`] executes
//! both against a [`Host`] that receives palettes, frames and music, and a
//! [`Player`] drives the interpreter one frame at a time.
//!
//! # Examples
//!
//! ```no_run
//! use dgds_script::prelude::*;
//! use dgds_types::file::Archive;
//!
//! let config = PlaybackConfig::default();
//! let loader = config.loader(Archive::open("RESOURCE.MAP")?)?;
//! let mut player = Player::new(loader, NullHost, config);
//! let report = player.play("INTRO.ADS")?;
//! println!("{} frames", report.frames);
//! # Ok::<(), ScriptError>(())
//! ```
//!
//! Disassembling a scene script:
//!
//! ```
//! use dgds_script::ttm::disassemble;
//!
//! let code = [0x11, 0x11, 0x02, 0x00, 0xF0, 0x0F, 0x00, 0x00];
//! let lines: Vec<String> = disassemble(&code).unwrap().iter().map(ToString::to_string).collect();
//! assert_eq!(lines[0], "0000: SET_SCENE    2");
//! assert_eq!(lines[1].trim_end(), "0004: REFRESH");
//! ```

pub mod ads;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod player;
pub mod surface;
pub mod ttm;

/// `use dgds_script::prelude::*;` to import commonly used items.
pub mod prelude;

#[doc(inline)]
pub use self::{
	config::PlaybackConfig,
	context::PlaybackContext,
	error::ScriptError,
	host::{Host, NullHost},
	interpreter::Interpreter,
	player::{PlaybackReport, Player},
};
