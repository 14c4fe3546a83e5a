//! Index reader
//!
//! Parses the repository's staged-file index (`.git/index`) into an ordered
//! list of tracked-file records.
//!
//! A bad signature or version is a structural failure and aborts the parse;
//! everything past the header degrades gracefully: a truncated entry stops
//! the walk with a warning, a declared/parsed count mismatch is warned, and
//! the trailing whole-index checksum is verified but a mismatch is only
//! logged.

use crate::artifacts::index::index_entry::{ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use anyhow::anyhow;
use byteorder::ByteOrder;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::path::Path;
use tracing::warn;

/// Reader for the binary index file
#[derive(Debug, new)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
}

impl Index {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the index file from disk
    pub fn load(&self) -> anyhow::Result<Vec<IndexEntry>> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| anyhow!("Unable to read index file {:?}: {}", self.path, e))?;

        Self::parse(&bytes)
    }

    /// Parse raw index bytes into the ordered entry list
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Vec<IndexEntry>> {
        if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(anyhow!("Index file too short: {} bytes", bytes.len()));
        }

        if &bytes[0..4] != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if version != VERSION {
            return Err(anyhow!("Unsupported index file version: {}", version));
        }
        let declared_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as usize;

        // The last 20 bytes are the whole-index digest, never entry data
        let data_end = bytes.len() - CHECKSUM_SIZE;

        // The declared count is untrusted input; never pre-allocate more
        // than the byte length can possibly hold
        let possible_count = (data_end - HEADER_SIZE) / ENTRY_MIN_SIZE;
        let mut entries = Vec::with_capacity(declared_count.min(possible_count));
        let mut offset = HEADER_SIZE;
        while entries.len() < declared_count && data_end - offset >= ENTRY_MIN_SIZE {
            match IndexEntry::parse(&bytes[offset..data_end]) {
                Ok((entry, consumed)) => {
                    entries.push(entry);
                    offset += consumed;
                }
                Err(e) => {
                    warn!("Stopping index parse at entry {}: {}", entries.len(), e);
                    break;
                }
            }
        }

        if entries.len() != declared_count {
            warn!(
                "Index declared {} entries but {} were parsed",
                declared_count,
                entries.len()
            );
        }

        let actual = Sha1::digest(&bytes[..data_end]);
        if actual.as_slice() != &bytes[data_end..] {
            warn!("Index checksum mismatch; continuing with parsed entries");
        }

        Ok(entries)
    }
}
