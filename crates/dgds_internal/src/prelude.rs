//! Prelude module for `dgds_internal`.
//!
//! Pulls in the resource types and the playback API in one import.
//!
//! # Examples
//!
//! ```rust
//! use dgds_internal::prelude::*;
//!
//! let archive = ArchiveBuilder::new([1, 2, 3, 4]).file("EMPTY.TTM", Vec::new()).build_archive();
//! let loader = PlaybackConfig::headless(1).loader(archive).unwrap();
//! let mut player = Player::new(loader, NullHost, PlaybackConfig::headless(1));
//! assert!(matches!(player.play("MISSING.TTM"), Err(ScriptError::NotFound { .. })));
//! ```

#[doc(inline)]
pub use dgds_script::prelude::*;
#[doc(inline)]
pub use dgds_types::prelude::*;

#[doc(inline)]
pub use dgds_script;
#[doc(inline)]
pub use dgds_types;
