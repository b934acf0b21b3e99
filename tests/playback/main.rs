//! Integration tests for `dgds-rs`: on-disk archives and full playback runs.

mod archive;
mod fixtures;
mod playback;
