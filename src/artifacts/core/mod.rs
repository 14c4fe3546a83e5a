//! Core utilities and shared types
//!
//! This module contains shared utilities used across the engine.

/// Escape HTML metacharacters in a string.
///
/// Index paths, author/committer identities and commit messages flow toward
/// the HTML rendering layer, so they are sanitized once at parse time and
/// stored escaped. The five characters with meaning in markup contexts are
/// replaced by their entity forms.
pub fn sanitize(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }

    output
}
