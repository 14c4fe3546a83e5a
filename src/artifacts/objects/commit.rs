//! Git commit object
//!
//! Commits record a snapshot of the repository at a point in time.
//!
//! ## Format
//!
//! On disk, after the `commit <size>\0` header:
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Header lines with unrecognized labels are ignored. Author/committer names,
//! emails and the message are rendering-bound and therefore sanitized against
//! markup injection at parse time.

use crate::artifacts::core::sanitize;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::BufRead;

/// Author or committer identity with timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }

    /// Format identity for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} &lt;{}&gt;", self.name, self.email)
    }
}

/// Parse a `+hhmm`/`-hhmm` timezone token into a fixed offset
fn parse_tz_offset(token: &str) -> anyhow::Result<chrono::FixedOffset> {
    // Byte-index slicing below is only safe on pure ASCII
    if token.len() != 5 || !token.is_ascii() {
        return Err(anyhow::anyhow!("Invalid timezone offset: {}", token));
    }

    let sign = match token.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(anyhow::anyhow!("Invalid timezone sign: {}", token)),
    };
    let hours = token[1..3].parse::<i32>()?;
    let minutes = token[3..5].parse::<i32>()?;

    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow::anyhow!("Timezone offset out of range: {}", token))
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone".
        // Split from the right so names may contain spaces.
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format: {}", value));
        }

        let offset = parse_tz_offset(parts[0])?;
        let seconds = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid author timestamp: {}", parts[1]))?;
        let name_email_part = parts[2]; // "name <email>"

        // The email brackets are the last pair; names may contain anything
        let email_start = name_email_part
            .rfind('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = sanitize(name_email_part[..email_start].trim());
        let email = sanitize(&name_email_part[email_start + 1..email_end]);

        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow::anyhow!("Author timestamp out of range: {}", seconds))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Git commit object
///
/// Immutable once constructed. The commit records its own object ID so the
/// commit map invariant `map key == commit.oid` is checkable locally. All
/// parent lines are retained; the pager follows the first parent only.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// The commit's own object ID (map key)
    oid: ObjectId,
    /// Tree object ID representing the directory snapshot
    tree_oid: ObjectId,
    /// Parent commit IDs (empty for the root commit, multiple for merges)
    parents: Vec<ObjectId>,
    /// Author who wrote the changes
    author: Author,
    /// Committer who recorded the commit
    committer: Author,
    /// Commit message, markup-sanitized
    message: String,
}

impl Commit {
    pub fn new(
        oid: ObjectId,
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            oid,
            tree_oid,
            parents,
            author,
            committer,
            message,
        }
    }

    /// Parse a commit payload (the bytes after the `commit <size>\0` header)
    ///
    /// Recognized header labels are `tree`, `parent`, `author` and
    /// `committer`; anything else is ignored. The bytes after the first blank
    /// line form the message.
    pub fn deserialize(oid: ObjectId, mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        let mut lines = content.lines();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let Some((label, rest)) = line.split_once(' ') else {
                continue;
            };
            match label {
                "tree" => tree_oid = Some(ObjectId::try_parse(rest)?),
                "parent" => parents.push(ObjectId::try_parse(rest)?),
                "author" => author = Some(Author::try_from(rest)?),
                "committer" => committer = Some(Author::try_from(rest)?),
                // gpgsig, encoding, mergetag and friends carry no history
                _ => {}
            }
        }

        let message = sanitize(&lines.collect::<Vec<&str>>().join("\n"));

        Ok(Commit {
            oid,
            tree_oid: tree_oid.context("Invalid commit object: missing tree line")?,
            parents,
            author: author.context("Invalid commit object: missing author line")?,
            committer: committer.context("Invalid commit object: missing committer line")?,
            message,
        })
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First-parent link used for ancestry hops
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.committer.timestamp()
    }
}
