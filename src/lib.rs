#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `dgds-rs` reads the resource archives of games built on the Dynamix Game
//! Development System and plays back their scene and sequence scripts.
//!
pub use dgds_internal::*;
