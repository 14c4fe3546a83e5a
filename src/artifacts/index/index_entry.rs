//! Index entry representation
//!
//! Each entry in the index represents a tracked file: timestamps, device,
//! inode, mode bits, uid/gid, size, content digest, flag bits and the
//! repository-relative path.
//!
//! ## Entry Format
//!
//! Fixed fields (62 bytes: ten 4-byte big-endian integers, a 20-byte digest
//! and a 2-byte flags field) followed by the NUL-terminated path, padded with
//! NULs so the whole record is a multiple of 8 bytes.

use crate::artifacts::core::sanitize;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::ByteOrder;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed (pre-path) portion of an entry in bytes
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Minimum size of a whole index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// File metadata stored in index entries
///
/// Both timestamps carry nanosecond precision; none of the fields are
/// interpreted by the engine, they are carried for the rendering layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: u32,
    /// Change time nanoseconds
    pub ctime_nsec: u32,
    /// Modification time (seconds since Unix epoch)
    pub mtime: u32,
    /// Modification time nanoseconds
    pub mtime_nsec: u32,
    /// Device ID
    pub dev: u32,
    /// Inode number
    pub ino: u32,
    /// File mode (permissions and type)
    pub mode: u32,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u32,
    /// Entry flag bits
    pub flags: u16,
}

/// Index entry representing a tracked file
///
/// Immutable once parsed. The path is markup-sanitized at parse time because
/// it flows toward HTML rendering.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndexEntry {
    /// File path relative to the repository root, sanitized
    pub path: String,
    /// SHA-1 hash of the file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Parse one entry from the head of `bytes`
    ///
    /// # Returns
    ///
    /// The entry and the number of bytes it consumed including alignment
    /// padding, or an error if the slice is truncated mid-entry.
    pub fn parse(bytes: &[u8]) -> anyhow::Result<(Self, usize)> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!(
                "Truncated index entry: {} bytes remain",
                bytes.len()
            ));
        }

        let metadata = EntryMetadata {
            ctime: byteorder::NetworkEndian::read_u32(&bytes[0..4]),
            ctime_nsec: byteorder::NetworkEndian::read_u32(&bytes[4..8]),
            mtime: byteorder::NetworkEndian::read_u32(&bytes[8..12]),
            mtime_nsec: byteorder::NetworkEndian::read_u32(&bytes[12..16]),
            dev: byteorder::NetworkEndian::read_u32(&bytes[16..20]),
            ino: byteorder::NetworkEndian::read_u32(&bytes[20..24]),
            mode: byteorder::NetworkEndian::read_u32(&bytes[24..28]),
            uid: byteorder::NetworkEndian::read_u32(&bytes[28..32]),
            gid: byteorder::NetworkEndian::read_u32(&bytes[32..36]),
            size: byteorder::NetworkEndian::read_u32(&bytes[36..40]),
            flags: byteorder::NetworkEndian::read_u16(&bytes[60..62]),
        };

        let mut oid_bytes = [0u8; 20];
        oid_bytes.copy_from_slice(&bytes[40..60]);
        let oid = ObjectId::from_raw_bytes(&oid_bytes);

        // NUL-terminated path follows the fixed fields
        let path_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing NUL terminator in entry path"))?;
        let path_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + path_end];
        let path = sanitize(std::str::from_utf8(path_bytes)?);

        // Pad to the next multiple of 8, with at least one NUL byte
        let unpadded = ENTRY_FIXED_SIZE + path_end;
        let consumed = (unpadded + ENTRY_BLOCK) / ENTRY_BLOCK * ENTRY_BLOCK;
        if consumed > bytes.len() {
            return Err(anyhow::anyhow!("Truncated index entry padding"));
        }

        Ok((IndexEntry { path, oid, metadata }, consumed))
    }
}

/// Encode an entry the way git writes it, for synthetic fixtures
#[cfg(test)]
pub(crate) fn encode_entry(path: &str, oid: &ObjectId, metadata: &EntryMetadata) -> Vec<u8> {
    use byteorder::WriteBytesExt;
    use std::io::Write;

    let mut bytes = Vec::new();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.ctime)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.ctime_nsec)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.mtime)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.mtime_nsec)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.dev)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.ino)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.mode)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.uid)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.gid)
        .unwrap();
    bytes
        .write_u32::<byteorder::NetworkEndian>(metadata.size)
        .unwrap();
    oid.write_raw_to(&mut bytes).unwrap();
    bytes
        .write_u16::<byteorder::NetworkEndian>(metadata.flags)
        .unwrap();
    bytes.write_all(path.as_bytes()).unwrap();

    bytes.push(0); // at least one NUL terminator
    while bytes.len() % ENTRY_BLOCK != 0 {
        bytes.push(0);
    }

    bytes
}
