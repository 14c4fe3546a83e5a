//! Git object types parsed from the loose-object store
//!
//! Git stores all content as zlib-compressed objects identified by SHA-1
//! hashes. The engine recognizes three kinds:
//!
//! - **Commit**: snapshot metadata (tree, parents, author, committer, message)
//! - **Tree**: directory listing (modes, names, and object IDs)
//! - **Blob**: file content, acknowledged but intentionally not parsed
//!
//! On disk every object carries the header `<type> <size>\0` before its
//! payload.

pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw binary format
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
