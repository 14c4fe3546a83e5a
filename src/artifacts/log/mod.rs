//! Commit history pagination
//!
//! Precomputes fixed-stride page anchors over single-parent ancestry so the
//! rendering layer gets O(1)-ish access to any history page.

pub mod pager;
