//! Page-anchor precomputation and page windows
//!
//! Starting at the default-branch head, every STRIDE-th ancestor along
//! first-parent links is recorded as an anchor. A log page is then served by
//! walking at most STRIDE hops from its anchor instead of from the head.
//!
//! The walk stops the moment a parent digest is missing from the commit map
//! (end of known history) and the anchor list is capped to bound memory on
//! pathological histories.

use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;

/// Ancestry hops between consecutive page anchors, and the page width
pub const DEFAULT_PAGE_STRIDE: usize = 16;

/// Upper bound on the precomputed anchor list
pub const DEFAULT_ANCHOR_CAP: usize = 65536;

/// Anchor builder and page-window reader
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    stride: usize,
    anchor_cap: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Pager {
            stride: DEFAULT_PAGE_STRIDE,
            anchor_cap: DEFAULT_ANCHOR_CAP,
        }
    }
}

impl Pager {
    /// Create a pager with an explicit stride and anchor cap
    ///
    /// A zero stride is clamped to one hop so the walk always advances.
    pub fn new(stride: usize, anchor_cap: usize) -> Self {
        Pager {
            stride: stride.max(1),
            anchor_cap,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Precompute the ordered anchor list from the resolved head digest
    ///
    /// `anchors[0]` is the head commit itself (empty list if the head is
    /// unresolvable or absent from the map); `anchors[i + 1]` is exactly
    /// `stride` first-parent hops below `anchors[i]`.
    pub fn build_anchors(
        &self,
        commits: &HashMap<ObjectId, Commit>,
        head: Option<&ObjectId>,
    ) -> Vec<ObjectId> {
        let mut anchors = Vec::new();
        let Some(mut current) = head.cloned() else {
            return anchors;
        };

        while anchors.len() < self.anchor_cap {
            let Some(commit) = commits.get(&current) else {
                break;
            };
            anchors.push(current.clone());

            // Advance stride first-parent hops; running out of known
            // ancestry ends the whole walk.
            let mut cursor = commit;
            let mut exhausted = false;
            for _ in 0..self.stride {
                match cursor.parent().and_then(|parent| commits.get(parent)) {
                    Some(next) => cursor = next,
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
            if exhausted {
                break;
            }
            current = cursor.oid().clone();
        }

        anchors
    }

    /// Read one fixed-width page of history
    ///
    /// # Returns
    ///
    /// Exactly `stride` slots in head-to-ancestor order, `None`-padded once
    /// ancestry runs out. An out-of-range page yields an all-`None` window.
    pub fn page_window<'c>(
        &self,
        commits: &'c HashMap<ObjectId, Commit>,
        anchors: &[ObjectId],
        page: usize,
    ) -> Vec<Option<&'c Commit>> {
        let mut window = vec![None; self.stride];
        let Some(start) = anchors.get(page) else {
            return window;
        };

        let mut cursor = commits.get(start);
        for slot in window.iter_mut() {
            match cursor {
                Some(commit) => {
                    *slot = Some(commit);
                    cursor = commit.parent().and_then(|parent| commits.get(parent));
                }
                None => break,
            }
        }

        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Author;

    fn nth_oid(n: usize) -> ObjectId {
        ObjectId::try_parse(format!("{:040x}", n + 1)).unwrap()
    }

    /// Linear chain: commit 0 is the head, commit n-1 the root
    fn chain(n: usize) -> (HashMap<ObjectId, Commit>, ObjectId) {
        let author = Author::try_from("A <a@x> 1700000000 +0000").unwrap();
        let tree = ObjectId::try_parse("aa".repeat(20)).unwrap();

        let mut commits = HashMap::new();
        for i in 0..n {
            let parents = if i + 1 < n {
                vec![nth_oid(i + 1)]
            } else {
                Vec::new()
            };
            commits.insert(
                nth_oid(i),
                Commit::new(
                    nth_oid(i),
                    tree.clone(),
                    parents,
                    author.clone(),
                    author.clone(),
                    format!("commit {}", i),
                ),
            );
        }

        (commits, nth_oid(0))
    }

    #[test]
    fn test_build_anchors_spaces_anchors_by_stride() {
        let (commits, head) = chain(40);
        let pager = Pager::default();

        let anchors = pager.build_anchors(&commits, Some(&head));

        pretty_assertions::assert_eq!(anchors.len(), 3);
        pretty_assertions::assert_eq!(anchors[0], nth_oid(0));
        pretty_assertions::assert_eq!(anchors[1], nth_oid(16));
        pretty_assertions::assert_eq!(anchors[2], nth_oid(32));
    }

    #[test]
    fn test_build_anchors_without_head_is_empty() {
        let (commits, _) = chain(5);
        let anchors = Pager::default().build_anchors(&commits, None);
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_build_anchors_with_unknown_head_is_empty() {
        let (commits, _) = chain(5);
        let stray = ObjectId::try_parse("ee".repeat(20)).unwrap();
        let anchors = Pager::default().build_anchors(&commits, Some(&stray));
        assert!(anchors.is_empty());
    }

    #[test]
    fn test_build_anchors_respects_the_cap() {
        let (commits, head) = chain(100);
        let pager = Pager::new(1, 10);

        let anchors = pager.build_anchors(&commits, Some(&head));
        pretty_assertions::assert_eq!(anchors.len(), 10);
    }

    #[test]
    fn test_first_page_of_a_twenty_commit_chain_is_full() {
        let (commits, head) = chain(20);
        let pager = Pager::default();
        let anchors = pager.build_anchors(&commits, Some(&head));

        let window = pager.page_window(&commits, &anchors, 0);

        pretty_assertions::assert_eq!(window.len(), 16);
        for (i, slot) in window.iter().enumerate() {
            pretty_assertions::assert_eq!(slot.unwrap().oid(), &nth_oid(i));
        }
    }

    #[test]
    fn test_second_page_holds_the_tail_then_nulls() {
        let (commits, head) = chain(20);
        let pager = Pager::default();
        let anchors = pager.build_anchors(&commits, Some(&head));

        let window = pager.page_window(&commits, &anchors, 1);

        pretty_assertions::assert_eq!(window.len(), 16);
        for (i, slot) in window.iter().take(4).enumerate() {
            pretty_assertions::assert_eq!(slot.unwrap().oid(), &nth_oid(16 + i));
        }
        assert!(window.iter().skip(4).all(|slot| slot.is_none()));
    }

    #[test]
    fn test_out_of_range_page_is_all_nulls() {
        let (commits, head) = chain(20);
        let pager = Pager::default();
        let anchors = pager.build_anchors(&commits, Some(&head));

        let window = pager.page_window(&commits, &anchors, 99);

        pretty_assertions::assert_eq!(window.len(), 16);
        assert!(window.iter().all(|slot| slot.is_none()));
    }
}
