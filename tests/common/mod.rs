//! Shared fixture for engine tests
//!
//! Builds synthetic repository clones on disk without invoking git: loose
//! objects compressed with zlib under their real SHA-1 digests, a version-2
//! binary index with a valid trailing checksum, and loose refs.

use byteorder::WriteBytesExt;
use gitpage::artifacts::objects::object_id::ObjectId;
use sha1::{Digest, Sha1};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct RepoFixture {
    temp: TempDir,
}

impl RepoFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let git_dir = temp.path().join(".git");
        std::fs::create_dir_all(git_dir.join("objects")).expect("objects dir");
        std::fs::create_dir_all(git_dir.join("refs").join("heads")).expect("refs dir");

        RepoFixture { temp }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.temp.path().join(".git")
    }

    /// Store `<kind> <len>\0<payload>` as a loose object under its digest
    pub fn write_object(&self, kind: &str, payload: &[u8]) -> ObjectId {
        let mut content = format!("{} {}\0", kind, payload.len()).into_bytes();
        content.extend_from_slice(payload);

        let oid = ObjectId::from_raw_bytes(&Sha1::digest(&content).into());

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&content).expect("compress");
        let compressed = encoder.finish().expect("finish");

        let object_path = self.git_dir().join("objects").join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().expect("fan-out dir")).expect("mkdir");
        std::fs::write(object_path, compressed).expect("write object");
        oid
    }

    pub fn write_blob(&self, content: &[u8]) -> ObjectId {
        self.write_object("blob", content)
    }

    /// Single-entry tree referencing the given blob
    pub fn write_tree(&self, name: &str, blob: &ObjectId) -> ObjectId {
        let mut payload = format!("100644 {}\0", name).into_bytes();
        blob.write_raw_to(&mut payload).expect("raw oid");
        self.write_object("tree", &payload)
    }

    pub fn write_commit(
        &self,
        tree: &ObjectId,
        parents: &[&ObjectId],
        timestamp: i64,
        subject: &str,
    ) -> ObjectId {
        let mut payload = format!("tree {}\n", tree);
        for parent in parents {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push_str(&format!("author Ada L <ada@example.org> {} +0000\n", timestamp));
        payload.push_str(&format!(
            "committer Ada L <ada@example.org> {} +0000\n",
            timestamp
        ));
        payload.push_str(&format!("\n{}", subject));
        self.write_object("commit", payload.as_bytes())
    }

    /// Write a loose ref, creating intermediate directories
    pub fn write_ref(&self, relative: &str, oid: &ObjectId) {
        let path = self.git_dir().join("refs").join(relative);
        std::fs::create_dir_all(path.parent().expect("ref parent")).expect("ref dirs");
        std::fs::write(path, format!("{}\n", oid)).expect("write ref");
    }

    /// Linear history of `n` commits; returns digests newest-first and
    /// points `refs/heads/master` at the newest
    pub fn write_linear_history(&self, n: usize) -> Vec<ObjectId> {
        let blob = self.write_blob(b"contents\n");
        let tree = self.write_tree("file.txt", &blob);

        let mut oids = Vec::new();
        let mut parent: Option<ObjectId> = None;
        for i in 0..n {
            let parents: Vec<&ObjectId> = parent.iter().collect();
            let oid = self.write_commit(
                &tree,
                &parents,
                1_700_000_000 + i as i64,
                &format!("commit {}", i),
            );
            parent = Some(oid.clone());
            oids.push(oid);
        }
        oids.reverse(); // newest first

        if let Some(head) = oids.first() {
            self.write_ref("heads/master", head);
        }
        oids
    }

    /// Write a version-2 index with a valid trailing checksum
    pub fn write_index(&self, entries: &[(&str, &ObjectId)]) {
        let mut bytes = Vec::new();
        bytes.write_all(b"DIRC").expect("signature");
        bytes.write_u32::<byteorder::NetworkEndian>(2).expect("version");
        bytes
            .write_u32::<byteorder::NetworkEndian>(entries.len() as u32)
            .expect("count");

        for (path, oid) in entries {
            bytes.extend(encode_index_entry(path, oid));
        }

        let checksum = Sha1::digest(&bytes);
        bytes.extend_from_slice(&checksum);
        std::fs::write(self.git_dir().join("index"), bytes).expect("write index");
    }
}

fn encode_index_entry(path: &str, oid: &ObjectId) -> Vec<u8> {
    let mut bytes = Vec::new();
    // ctime, ctime_nsec, mtime, mtime_nsec, dev, ino, mode, uid, gid, size
    for value in [
        1_700_000_000u32,
        0,
        1_700_000_000,
        0,
        64768,
        99,
        0o100644,
        1000,
        1000,
        9,
    ] {
        bytes
            .write_u32::<byteorder::NetworkEndian>(value)
            .expect("field");
    }
    oid.write_raw_to(&mut bytes).expect("raw oid");
    bytes
        .write_u16::<byteorder::NetworkEndian>(path.len().min(0xfff) as u16)
        .expect("flags");
    bytes.write_all(path.as_bytes()).expect("path");

    bytes.push(0);
    while bytes.len() % 8 != 0 {
        bytes.push(0);
    }
    bytes
}
