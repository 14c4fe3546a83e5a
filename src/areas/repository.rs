//! Repository engine facade
//!
//! Owns the refresh cycle and the read-only accessor surface. On open it
//! expands any packfiles into loose objects (the one startup dependency on
//! the external tool), optionally resynchronizes tags, and runs the first
//! refresh. Afterwards many readers query the current snapshot while a
//! single maintenance actor calls [`Repository::refresh`] after each pull.
//!
//! ## Publication
//!
//! A refresh builds every map into fresh structures and publishes the
//! finished [`Snapshot`] with one `Arc` swap; readers never observe a
//! partially rebuilt mapping. Overlapping refresh calls are serialized by an
//! internal mutex, and `last_update` travels inside the snapshot so both are
//! read without tearing.

use crate::areas::database::Database;
use crate::areas::git_cli::GitCli;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::log::pager::Pager;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::snapshot::Snapshot;
use anyhow::Context;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Ref names tried, in order, when resolving the default branch head
const DEFAULT_BRANCH_REFS: [&str; 2] = ["heads_master", "heads_main"];

/// One browsable repository clone
pub struct Repository {
    path: Box<Path>,
    git_dir: Box<Path>,
    git: GitCli,
    pager: Pager,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_gate: Mutex<()>,
}

impl Repository {
    /// Open a repository clone and materialize its first snapshot
    ///
    /// `remote` marks clones allowed to synchronize with their origin: their
    /// locally cached tags are dropped and re-fetched so ref resolution
    /// matches the history actually present as loose objects.
    pub fn open(path: impl AsRef<Path>, remote: bool) -> anyhow::Result<Self> {
        Self::open_with_pager(path, remote, Pager::default())
    }

    /// Open with an explicit page stride and anchor cap
    pub fn open_with_pager(
        path: impl AsRef<Path>,
        remote: bool,
        pager: Pager,
    ) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .canonicalize()
            .with_context(|| format!("Invalid repository path {:?}", path.as_ref()))?;
        let git_dir = path.join(".git");
        if !git_dir.is_dir() {
            anyhow::bail!("No repository found at {:?}", path);
        }

        let repository = Repository {
            git: GitCli::new(path.clone().into_boxed_path()),
            path: path.into_boxed_path(),
            git_dir: git_dir.into_boxed_path(),
            pager,
            snapshot: RwLock::new(Arc::new(Snapshot::empty(pager))),
            refresh_gate: Mutex::new(()),
        };

        repository.unpack_packfiles();
        if remote {
            repository.resync_tags();
        }
        repository.refresh()?;

        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Expand every packfile into loose objects, once, at startup
    ///
    /// Packs are moved out of `objects/pack` first: git refuses to unpack
    /// objects it considers already reachable through a pack. Per-pack
    /// failures are logged and skipped so one bad pack cannot block the rest.
    fn unpack_packfiles(&self) {
        let pack_dir = self.git_dir.join("objects").join("pack");
        let entries = match std::fs::read_dir(&pack_dir) {
            Ok(entries) => entries,
            Err(_) => return, // no pack directory, nothing to expand
        };

        for entry in entries.flatten() {
            let pack_path = entry.path();
            let Some(file_name) = pack_path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !file_name.ends_with(".pack") {
                continue;
            }

            let staged = self.git_dir.join(file_name);
            if let Err(e) = std::fs::rename(&pack_path, &staged) {
                warn!("Unable to stage packfile {:?}: {}", pack_path, e);
                continue;
            }

            debug!("Unpacking {:?}", file_name);
            if let Err(e) = self.git.unpack_objects(&staged) {
                warn!("Unable to unpack {:?}: {}", file_name, e);
            }

            if let Err(e) = std::fs::remove_file(&staged) {
                warn!("Unable to remove staged packfile {:?}: {}", staged, e);
            }
            let idx = pack_dir.join(format!("{}.idx", file_name.trim_end_matches(".pack")));
            if idx.exists()
                && let Err(e) = std::fs::remove_file(&idx)
            {
                warn!("Unable to remove pack index {:?}: {}", idx, e);
            }
        }
    }

    /// Drop locally cached tags and re-fetch them from the origin
    fn resync_tags(&self) {
        let tags_dir = self.git_dir.join("refs").join("tags");
        if tags_dir.is_dir()
            && let Err(e) = std::fs::remove_dir_all(&tags_dir)
        {
            warn!("Unable to drop cached tags {:?}: {}", tags_dir, e);
        }
        self.git.fetch_tags();
    }

    /// Rebuild the snapshot from on-disk state and publish it atomically
    ///
    /// The phases run in sequence: index, refs, object store, page anchors.
    /// A structural index failure loses only the file listing; the other
    /// phases still run so refs and history remain available.
    pub fn refresh(&self) -> anyhow::Result<()> {
        let _gate = self
            .refresh_gate
            .lock()
            .map_err(|_| anyhow::anyhow!("Refresh gate poisoned"))?;

        let entries = self.load_index_entries();
        let refs = Refs::new(self.git_dir.join("refs").into_boxed_path()).resolve();
        let objects = Database::new(self.git_dir.join("objects").into_boxed_path()).read_all();

        let head = DEFAULT_BRANCH_REFS
            .iter()
            .find_map(|name| refs.get(*name));
        if head.is_none() {
            debug!("No default branch ref resolved for {:?}", self.path);
        }
        let anchors = self.pager.build_anchors(&objects.commits, head);

        let previous = self.current();
        let last_update = chrono::Utc::now().max(previous.last_update());

        let snapshot = Arc::new(Snapshot::new(
            entries,
            refs,
            objects.trees,
            objects.commits,
            objects.blobs,
            anchors,
            self.pager,
            last_update,
        ));

        let mut published = self
            .snapshot
            .write()
            .map_err(|_| anyhow::anyhow!("Snapshot lock poisoned"))?;
        *published = snapshot;

        Ok(())
    }

    fn load_index_entries(&self) -> Vec<IndexEntry> {
        let index = Index::new(self.git_dir.join("index").into_boxed_path());
        match index.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Index read failed, file listing unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// The current complete snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current()
    }

    fn current(&self) -> Arc<Snapshot> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            // a poisoned lock still holds a complete snapshot
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Tracked file paths, optionally collapsed to root-level names
    pub fn tracked_files(&self, root_only: bool) -> Vec<String> {
        self.current().tracked_files(root_only)
    }

    /// One fixed-width page of history in head-to-ancestor order
    pub fn log(&self, page: usize) -> Vec<Option<Commit>> {
        self.current()
            .page(page)
            .into_iter()
            .map(|slot| slot.cloned())
            .collect()
    }

    /// Look up one commit by its 40-hex digest
    pub fn commit(&self, digest: &str) -> Option<Commit> {
        self.current().commit(digest).cloned()
    }

    pub fn commit_count(&self) -> usize {
        self.current().commit_count()
    }

    pub fn page_count(&self) -> usize {
        self.current().page_count()
    }

    /// Head commit of the default branch
    pub fn head(&self) -> Option<Commit> {
        self.current().head().cloned()
    }

    /// Cache-invalidation stamp of the current snapshot
    pub fn last_update(&self) -> chrono::DateTime<chrono::Utc> {
        self.current().last_update()
    }

    /// Digest of the resolved default branch head, if any
    pub fn head_oid(&self) -> Option<ObjectId> {
        self.current().anchors().first().cloned()
    }

    /// Textual diff for a commit, delegated to the external tool
    pub fn diff(&self, commit: &str) -> String {
        self.git.diff(commit)
    }

    /// Fetch from origin, delegated; callers should refresh afterwards
    pub fn fetch(&self) -> String {
        self.git.fetch()
    }

    /// Pull from origin, delegated; callers should refresh afterwards
    pub fn pull(&self) -> String {
        self.git.pull()
    }
}
