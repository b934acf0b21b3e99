//! Playback errors.

use dgds_types::file::DgdsError;
use thiserror::Error;

/// Errors raised while preparing or running playback.
#[derive(Debug, Error)]
pub enum ScriptError {
	/// A script or resource failed to decode
	#[error(transparent)]
	Resource(#[from] DgdsError),

	/// A script file is not in the archive
	#[error("script not found: {name}")]
	NotFound {
		/// Requested file name
		name: String,
	},

	/// The file extension does not name a script kind
	#[error("not a script file: {name}")]
	NotAScript {
		/// Requested file name
		name: String,
	},

	/// Configuration could not be read or deserialized
	#[error("configuration error: {0}")]
	Config(#[from] config::ConfigError),
}
