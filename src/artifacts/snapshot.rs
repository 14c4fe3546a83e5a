//! Repository snapshot
//!
//! One complete, immutable in-memory materialization of a repository's
//! index, refs, objects and precomputed page anchors, as of a given refresh.
//! A refresh builds a wholly new snapshot off to the side and publishes it
//! with a single reference swap; concurrent readers always observe either
//! the complete old snapshot or the complete new one.

use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::log::pager::Pager;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Immutable aggregate of everything one refresh cycle materialized
///
/// Map keys are the lowercase-hex digests of the objects they store;
/// `commits[key].oid() == key` holds for every entry. The `last_update`
/// stamp travels inside the snapshot so it is published atomically with it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    entries: Vec<IndexEntry>,
    refs: HashMap<String, ObjectId>,
    trees: HashMap<ObjectId, Tree>,
    commits: HashMap<ObjectId, Commit>,
    blobs: HashSet<ObjectId>,
    anchors: Vec<ObjectId>,
    pager: Pager,
    last_update: chrono::DateTime<chrono::Utc>,
}

impl Snapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entries: Vec<IndexEntry>,
        refs: HashMap<String, ObjectId>,
        trees: HashMap<ObjectId, Tree>,
        commits: HashMap<ObjectId, Commit>,
        blobs: HashSet<ObjectId>,
        anchors: Vec<ObjectId>,
        pager: Pager,
        last_update: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Snapshot {
            entries,
            refs,
            trees,
            commits,
            blobs,
            anchors,
            pager,
            last_update,
        }
    }

    /// Placeholder published before the first refresh completes
    pub fn empty(pager: Pager) -> Self {
        Snapshot {
            entries: Vec::new(),
            refs: HashMap::new(),
            trees: HashMap::new(),
            commits: HashMap::new(),
            blobs: HashSet::new(),
            anchors: Vec::new(),
            pager,
            last_update: chrono::DateTime::<chrono::Utc>::MIN_UTC,
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn refs(&self) -> &HashMap<String, ObjectId> {
        &self.refs
    }

    pub fn trees(&self) -> &HashMap<ObjectId, Tree> {
        &self.trees
    }

    pub fn commits(&self) -> &HashMap<ObjectId, Commit> {
        &self.commits
    }

    pub fn blobs(&self) -> &HashSet<ObjectId> {
        &self.blobs
    }

    pub fn anchors(&self) -> &[ObjectId] {
        &self.anchors
    }

    /// Cache-invalidation key for the rendering layer; non-decreasing
    /// across refreshes
    pub fn last_update(&self) -> chrono::DateTime<chrono::Utc> {
        self.last_update
    }

    /// Head commit of the default branch, if its ref resolved
    pub fn head(&self) -> Option<&Commit> {
        self.anchors.first().and_then(|oid| self.commits.get(oid))
    }

    /// Look up one commit by its 40-hex digest
    pub fn commit(&self, digest: &str) -> Option<&Commit> {
        let oid = ObjectId::try_parse(digest).ok()?;
        self.commits.get(&oid)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Number of precomputed history pages
    pub fn page_count(&self) -> usize {
        self.anchors.len()
    }

    /// One fixed-width page of history in head-to-ancestor order
    pub fn page(&self, page: usize) -> Vec<Option<&Commit>> {
        self.pager.page_window(&self.commits, &self.anchors, page)
    }

    /// Tracked file paths from the index
    ///
    /// With `root_only` the listing collapses to the unique first path
    /// segments (top-level files and directories), sorted.
    pub fn tracked_files(&self, root_only: bool) -> Vec<String> {
        if root_only {
            self.entries
                .iter()
                .filter_map(|entry| entry.path.split('/').next())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        } else {
            self.entries
                .iter()
                .map(|entry| entry.path.clone())
                .collect()
        }
    }
}
