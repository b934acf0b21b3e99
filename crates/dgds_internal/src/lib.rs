//! Glue crate behind `dgds-rs`; depend on `dgds-rs` instead of using this directly.

/// `use dgds_rs::prelude::*;` to import commonly used items.
pub mod prelude;

pub use dgds_script;
pub use dgds_types;

pub use dgds_script::{PlaybackConfig, Player, ScriptError};
pub use dgds_types::file::{Archive, DgdsError, ResourceLoader};
