//! Repository engine for a lightweight git web front end.
//!
//! The engine reads a local clone's on-disk storage (the binary index file,
//! loose refs and zlib-compressed loose objects) directly and materializes
//! an immutable, queryable [`Snapshot`](artifacts::snapshot::Snapshot) of the
//! commit history. The hot read path never shells out to git; the external
//! binary is invoked only for packfile expansion at startup and for the
//! delegated diff/fetch/pull operations.
//!
//! Rendering, HTTP serving, configuration and the periodic maintenance loop
//! are external collaborators. They consume the read-only accessor surface of
//! [`Repository`](areas::repository::Repository) and call
//! [`refresh`](areas::repository::Repository::refresh) after a pull.

pub mod areas;
pub mod artifacts;
