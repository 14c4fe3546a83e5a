//! Git tree object
//!
//! Trees are directory snapshots: an ordered list of entries, each carrying an
//! octal file mode, a name and the object ID of the referenced object.
//!
//! ## Format
//!
//! On disk, after the `tree <size>\0` header, each entry is
//! `<octal-mode> <name>\0<20-byte-sha1>`.
//!
//! The engine does not traverse trees recursively (no path-to-blob
//! resolution); they are kept in the object map for completeness.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::io::BufRead;

/// One entry of a tree: mode, name, and referenced object
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct TreeEntry {
    /// File mode bits, parsed from the octal token
    pub mode: u32,
    /// Entry name within the directory
    pub name: String,
    /// Object ID of the referenced blob or subtree
    pub oid: ObjectId,
}

/// Git tree object identified by its digest
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tree {
    oid: ObjectId,
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(oid: ObjectId, entries: Vec<TreeEntry>) -> Self {
        Tree { oid, entries }
    }

    /// Parse a tree payload (the bytes after the `tree <size>\0` header)
    ///
    /// Entries are consumed until the payload is exhausted.
    pub fn deserialize(oid: ObjectId, mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(anyhow::anyhow!("unexpected EOF in tree entry mode"));
            }

            let mode_str = std::str::from_utf8(&mode_bytes)?;
            let mode = u32::from_str_radix(mode_str, 8)
                .with_context(|| format!("invalid octal mode {:?}", mode_str))?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                return Err(anyhow::anyhow!("unexpected EOF in tree entry name"));
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let entry_oid = ObjectId::read_raw_from(&mut reader)
                .context("unexpected EOF in tree entry object id")?;

            entries.push(TreeEntry::new(mode, name, entry_oid));
        }

        Ok(Tree { oid, entries })
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }
}
