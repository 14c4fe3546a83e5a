//! Repository engine components
//!
//! The phases of a refresh cycle plus the delegated tool boundary:
//!
//! - `index`: parses the binary staged-file index into tracked-file entries
//! - `refs`: resolves loose refs into a name→digest map
//! - `database`: walks the loose-object store into typed records
//! - `git_cli`: the narrow external-tool boundary (unpack, diff, fetch, pull)
//! - `repository`: orchestrates refreshes and exposes the accessor surface

pub mod database;
pub mod git_cli;
pub mod index;
pub mod refs;
pub mod repository;
