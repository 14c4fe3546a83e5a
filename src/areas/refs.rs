//! Ref resolver
//!
//! Resolves the loose refs under `.git/refs` into a flat name→digest map.
//! Names are built by joining path segments with `_` (e.g. `heads_master`),
//! passing the accumulated prefix down the recursion explicitly; the result
//! map is assembled bottom-up, never through a shared accumulator.
//!
//! One ref per regular file; unreadable or non-hex entries are skipped with
//! a warning. The packed-refs format is explicitly not handled; after the
//! startup unpack every ref of interest is a loose file.

use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Resolver for the loose refs directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the refs root (typically `.git/refs`)
    path: Box<Path>,
}

impl Refs {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve every loose ref under the root
    pub fn resolve(&self) -> HashMap<String, ObjectId> {
        Self::walk(&self.path, "")
    }

    /// Depth-first walk carrying the accumulated name prefix
    fn walk(dir: &Path, prefix: &str) -> HashMap<String, ObjectId> {
        let mut refs = HashMap::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping unreadable refs directory {:?}: {}", dir, e);
                return refs;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable refs entry under {:?}: {}", dir, e);
                    continue;
                }
            };

            let path = entry.path();
            let Some(segment) = path.file_name().and_then(|name| name.to_str()) else {
                warn!("Skipping ref with non-UTF-8 name under {:?}", dir);
                continue;
            };
            let name = format!("{}{}", prefix, segment);

            if path.is_dir() {
                refs.extend(Self::walk(&path, &format!("{}_", name)));
            } else {
                match Self::read_ref_file(&path) {
                    Ok(oid) => {
                        refs.insert(name, oid);
                    }
                    Err(e) => warn!("Skipping unreadable ref {:?}: {}", path, e),
                }
            }
        }

        refs
    }

    /// Parse the 40-hex digest out of one loose ref file
    fn read_ref_file(path: &Path) -> anyhow::Result<ObjectId> {
        let content = std::fs::read_to_string(path)?;
        ObjectId::try_parse(content.trim())
    }
}
