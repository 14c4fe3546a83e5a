use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::tree::Tree;

/// Result of dispatching one loose object by its declared type
///
/// A closed set resolved once at parse time: the store reader matches the
/// header token a single time and every later use site works with the
/// variant, never with the type string.
#[derive(Debug, Clone)]
pub enum ParsedObject {
    Tree(Tree),
    Commit(Commit),
    /// Recognized kind whose payload is intentionally not parsed
    Blob,
    /// Header carried a type token the engine does not model
    Unrecognized(String),
}
