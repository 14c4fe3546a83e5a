//! Object store reader
//!
//! Walks the loose-object store (`.git/objects/<2-hex>/<38-hex>`),
//! decompresses each object into a bounded buffer and dispatches it by its
//! declared type into a typed record. Blobs are acknowledged but their
//! payload is never parsed; unrecognized kinds are warned and skipped.
//!
//! A malformed object (undecompressable, truncated, or with a garbled
//! payload) is logged and skipped; it never aborts the whole store read.

use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::ParsedObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::{ObjectType, read_object_header};
use crate::artifacts::objects::tree::Tree;
use bytes::Bytes;
use derive_new::new;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Upper bound on a single decompressed object (64 MiB)
const MAX_OBJECT_SIZE: u64 = 64 * 1024 * 1024;

/// The union of typed records one store read produced
#[derive(Debug, Default)]
pub struct ObjectSet {
    /// Trees keyed by their digest
    pub trees: HashMap<ObjectId, Tree>,
    /// Commits keyed by their digest; `commits[key].oid() == key`
    pub commits: HashMap<ObjectId, Commit>,
    /// Digests of blobs whose presence was acknowledged
    pub blobs: HashSet<ObjectId>,
}

/// Reader for the loose-object store
#[derive(Debug, new)]
pub struct Database {
    /// Path to the objects root (typically `.git/objects`)
    path: Box<Path>,
}

impl Database {
    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Read every loose object under the two-level hash fan-out
    ///
    /// `pack/` and `info/` live under the same root but hold no loose
    /// objects; anything not shaped like `<2-hex>/<38-hex>` is skipped.
    pub fn read_all(&self) -> ObjectSet {
        let mut set = ObjectSet::default();

        let walker = WalkDir::new(&self.path).min_depth(2).max_depth(2);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable object store entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(oid) = Self::oid_from_fan_out(entry.path()) else {
                continue;
            };

            match self.read_object(&oid, entry.path()) {
                Ok(ParsedObject::Tree(tree)) => {
                    set.trees.insert(oid, tree);
                }
                Ok(ParsedObject::Commit(commit)) => {
                    set.commits.insert(oid, commit);
                }
                Ok(ParsedObject::Blob) => {
                    set.blobs.insert(oid);
                }
                Ok(ParsedObject::Unrecognized(kind)) => {
                    warn!("Skipping object {} of unrecognized kind {:?}", oid, kind);
                }
                Err(e) => {
                    warn!("Skipping malformed object {}: {}", oid, e);
                }
            }
        }

        set
    }

    /// Rebuild the digest from `<2-hex-dir>/<38-hex-file>`
    fn oid_from_fan_out(path: &Path) -> Option<ObjectId> {
        let file = path.file_name()?.to_str()?;
        let dir = path.parent()?.file_name()?.to_str()?;
        if dir.len() != 2 {
            return None;
        }

        ObjectId::try_parse(format!("{}{}", dir, file)).ok()
    }

    /// Decompress one loose object and dispatch on its declared type
    fn read_object(&self, oid: &ObjectId, path: &Path) -> anyhow::Result<ParsedObject> {
        let compressed = std::fs::read(path)?;
        let content = Self::decompress(&compressed)?;

        let mut reader = Cursor::new(content);
        let (kind, _declared_length) = read_object_header(&mut reader)?;

        match ObjectType::try_from(kind.as_str()) {
            Ok(ObjectType::Tree) => Ok(ParsedObject::Tree(Tree::deserialize(oid.clone(), reader)?)),
            Ok(ObjectType::Commit) => Ok(ParsedObject::Commit(Commit::deserialize(
                oid.clone(),
                reader,
            )?)),
            // presence acknowledged, payload intentionally not parsed
            Ok(ObjectType::Blob) => Ok(ParsedObject::Blob),
            Err(_) => Ok(ParsedObject::Unrecognized(kind)),
        }
    }

    /// Inflate zlib data into a bounded buffer
    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let decoder = flate2::read::ZlibDecoder::new(data);
        let mut content = Vec::new();
        decoder
            .take(MAX_OBJECT_SIZE + 1)
            .read_to_end(&mut content)
            .map_err(|e| anyhow::anyhow!("Unable to decompress object content: {}", e))?;

        if content.len() as u64 > MAX_OBJECT_SIZE {
            return Err(anyhow::anyhow!(
                "Object exceeds the {} byte decompression bound",
                MAX_OBJECT_SIZE
            ));
        }

        Ok(content.into())
    }
}
