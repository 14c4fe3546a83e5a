//! Engine data model
//!
//! This module contains the immutable types the engine materializes from a
//! repository's on-disk storage:
//!
//! - `core`: shared utilities (markup sanitizer)
//! - `index`: index file format and tracked-file entries
//! - `log`: page-anchor precomputation over single-parent ancestry
//! - `objects`: git object types (commit, tree, object id)
//! - `snapshot`: one complete materialization of a repository

pub mod core;
pub mod index;
pub mod log;
pub mod objects;
pub mod snapshot;
