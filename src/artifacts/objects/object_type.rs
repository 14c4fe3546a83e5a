use std::io::BufRead;

/// Recognized loose-object kinds
///
/// Resolved once from the object header at parse time; everything else is
/// reported as unrecognized by the store reader and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(anyhow::anyhow!("Invalid object type: {}", value)),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read the `<type> <byte-length>\0` header of a decompressed loose object
///
/// # Returns
///
/// The raw type token and the declared payload length. The token is returned
/// verbatim so the caller can report unrecognized kinds instead of failing.
pub fn read_object_header(reader: &mut impl BufRead) -> anyhow::Result<(String, usize)> {
    let mut type_bytes = Vec::new();
    reader.read_until(b' ', &mut type_bytes)?;
    if type_bytes.pop() != Some(b' ') {
        return Err(anyhow::anyhow!("Truncated object header: missing type"));
    }
    let object_type = String::from_utf8(type_bytes)?;

    let mut size_bytes = Vec::new();
    reader.read_until(b'\0', &mut size_bytes)?;
    if size_bytes.pop() != Some(b'\0') {
        return Err(anyhow::anyhow!("Truncated object header: missing length"));
    }
    let declared_length = std::str::from_utf8(&size_bytes)?.parse::<usize>()?;

    Ok((object_type, declared_length))
}
