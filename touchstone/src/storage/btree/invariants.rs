//! Structural checks over a whole tree.
//!
//! `verify` walks every node reachable from the root and reports the first
//! broken invariant it finds:
//!
//! - only the root carries the root flag, and every other node points at its
//!   actual parent
//! - leaf keys are strictly ascending and fall inside the range the parent
//!   assigns to that child
//! - internal key `i` equals the largest key under child `i`
//! - every leaf sits at the same depth
//! - the leaf chain visits every leaf left to right and ends with 0
//! - no node holds more cells than its maximum, and only the root may be empty

use std::collections::HashSet;
use std::fmt;

use crate::storage::btree::node::{
    InternalNode, LEAF_NODE_MAX_CELLS, LeafNode, NodeError, NodeType, is_node_root, node_parent,
    node_type,
};
use crate::storage::page::PageNum;
use crate::storage::pager::{Pager, PagerError};

/// Shape of a tree that passed verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Levels from the root to the leaves, counting both.
    pub depth: u32,
    pub leaf_count: u32,
    pub internal_count: u32,
    pub row_count: u32,
}

/// A broken invariant, or a page that could not be read while checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub page_num: PageNum,
    pub message: String,
}

impl InvariantViolation {
    fn new(page_num: PageNum, message: impl Into<String>) -> Self {
        Self {
            page_num,
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}: {}", self.page_num, self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check the tree rooted at `root`. Internal nodes may hold up to
/// `internal_max_cells` keys.
pub fn verify(
    pager: &mut Pager,
    root: PageNum,
    internal_max_cells: u32,
) -> Result<TreeStats, InvariantViolation> {
    let mut walker = Walker {
        pager,
        root,
        internal_max_cells,
        visited: HashSet::new(),
        leaves: Vec::new(),
        leaf_depth: None,
        stats: TreeStats::default(),
    };

    walker.visit(root, None, None, None, 1)?;
    walker.check_leaf_chain()?;

    let mut stats = walker.stats;
    stats.depth = walker.leaf_depth.unwrap_or(1);
    Ok(stats)
}

struct Walker<'a> {
    pager: &'a mut Pager,
    root: PageNum,
    internal_max_cells: u32,
    visited: HashSet<PageNum>,
    /// Leaves in the order the walk reached them, which is key order.
    leaves: Vec<PageNum>,
    leaf_depth: Option<u32>,
    stats: TreeStats,
}

impl Walker<'_> {
    /// Check the subtree at `page_num`, whose keys must lie in `(lower, upper]`.
    ///
    /// Returns the largest key in the subtree, or `None` for an empty root leaf.
    fn visit(
        &mut self,
        page_num: PageNum,
        parent: Option<PageNum>,
        lower: Option<u32>,
        upper: Option<u32>,
        depth: u32,
    ) -> Result<Option<u32>, InvariantViolation> {
        if !self.visited.insert(page_num) {
            return Err(InvariantViolation::new(page_num, "page reached twice"));
        }

        let page = self
            .pager
            .get_page(page_num)
            .map_err(|e| read_failure(page_num, &e))?;

        let is_root = page_num == self.root;
        if is_node_root(page) != is_root {
            return Err(InvariantViolation::new(
                page_num,
                format!("root flag is {}, expected {is_root}", is_node_root(page)),
            ));
        }
        if let Some(parent) = parent {
            let recorded = node_parent(page);
            if recorded != parent {
                return Err(InvariantViolation::new(
                    page_num,
                    format!("parent pointer is {recorded}, expected {parent}"),
                ));
            }
        }

        match node_type(page).map_err(|e| node_failure(page_num, &e))? {
            NodeType::Leaf => {
                let leaf = LeafNode::new(&*page).map_err(|e| node_failure(page_num, &e))?;
                let num_cells = leaf.num_cells();
                if num_cells > LEAF_NODE_MAX_CELLS {
                    return Err(InvariantViolation::new(
                        page_num,
                        format!("leaf holds {num_cells} cells (max {LEAF_NODE_MAX_CELLS})"),
                    ));
                }
                if num_cells == 0 && !is_root {
                    return Err(InvariantViolation::new(page_num, "non-root leaf is empty"));
                }

                let mut previous = lower;
                for i in 0..num_cells {
                    let key = leaf.key(i).map_err(|e| node_failure(page_num, &e))?;
                    if previous.is_some_and(|p| key <= p) {
                        return Err(InvariantViolation::new(
                            page_num,
                            format!("key {key} at cell {i} is out of order"),
                        ));
                    }
                    if upper.is_some_and(|u| key > u) {
                        return Err(InvariantViolation::new(
                            page_num,
                            format!("key {key} at cell {i} is above the parent bound"),
                        ));
                    }
                    previous = Some(key);
                }

                match self.leaf_depth {
                    None => self.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(InvariantViolation::new(
                            page_num,
                            format!("leaf at depth {depth}, others at depth {expected}"),
                        ));
                    }
                    Some(_) => {}
                }

                self.leaves.push(page_num);
                self.stats.leaf_count += 1;
                self.stats.row_count += num_cells;
                Ok(if num_cells == 0 { None } else { previous })
            }
            NodeType::Internal => {
                let node = InternalNode::new(&*page).map_err(|e| node_failure(page_num, &e))?;
                let num_keys = node.num_keys();
                if num_keys == 0 || num_keys > self.internal_max_cells {
                    return Err(InvariantViolation::new(
                        page_num,
                        format!(
                            "internal node holds {num_keys} keys (allowed 1..={})",
                            self.internal_max_cells
                        ),
                    ));
                }
                let mut cells = Vec::with_capacity(num_keys as usize);
                for i in 0..num_keys {
                    let child = node.child(i).map_err(|e| node_failure(page_num, &e))?;
                    let key = node.key(i).map_err(|e| node_failure(page_num, &e))?;
                    cells.push((child, key));
                }
                let right_child = node.right_child();
                self.stats.internal_count += 1;

                let mut bound = lower;
                for (i, (child, key)) in cells.into_iter().enumerate() {
                    if bound.is_some_and(|b| key <= b) {
                        return Err(InvariantViolation::new(
                            page_num,
                            format!("key {key} at cell {i} is out of order"),
                        ));
                    }
                    let child_max = self.visit(child, Some(page_num), bound, Some(key), depth + 1)?;
                    if child_max != Some(key) {
                        return Err(InvariantViolation::new(
                            page_num,
                            format!("key {key} at cell {i} but child {child} has max {child_max:?}"),
                        ));
                    }
                    bound = Some(key);
                }
                self.visit(right_child, Some(page_num), bound, upper, depth + 1)
            }
        }
    }

    /// Follow `next_leaf` from the leftmost leaf and compare with the walk order.
    fn check_leaf_chain(&mut self) -> Result<(), InvariantViolation> {
        for (i, &leaf_page) in self.leaves.iter().enumerate() {
            let page = self
                .pager
                .get_page(leaf_page)
                .map_err(|e| read_failure(leaf_page, &e))?;
            let next = LeafNode::new(&*page)
                .map_err(|e| node_failure(leaf_page, &e))?
                .next_leaf();
            let expected = self.leaves.get(i + 1).copied().unwrap_or(0);
            if next != expected {
                return Err(InvariantViolation::new(
                    leaf_page,
                    format!("next leaf is {next}, expected {expected}"),
                ));
            }
        }
        Ok(())
    }
}

fn read_failure(page_num: PageNum, e: &PagerError) -> InvariantViolation {
    InvariantViolation::new(page_num, format!("could not read page: {e}"))
}

fn node_failure(page_num: PageNum, e: &NodeError) -> InvariantViolation {
    InvariantViolation::new(page_num, format!("malformed node: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::btree::node::set_node_parent;
    use crate::storage::btree::tree::{BTree, ROOT_PAGE_NUM};
    use crate::storage::memory::MemoryStorage;
    use crate::types::Row;

    fn build_tree(keys: impl IntoIterator<Item = u32>) -> Pager {
        let mut pager = Pager::open(Box::new(MemoryStorage::new()), 100).expect("open pager");
        let mut tree = BTree::new(&mut pager, 3);
        tree.initialize_root().expect("initialize root");
        for key in keys {
            let row = Row::new(key, "name", "mail@example.com").expect("valid row");
            tree.insert(key, &row).expect("insert");
        }
        pager
    }

    #[test]
    fn test_empty_tree() {
        let mut pager = build_tree([]);
        let stats = verify(&mut pager, ROOT_PAGE_NUM, 3).expect("valid");
        assert_eq!(
            stats,
            TreeStats {
                depth: 1,
                leaf_count: 1,
                internal_count: 0,
                row_count: 0
            }
        );
    }

    #[test]
    fn test_two_level_tree() {
        let mut pager = build_tree(1..=14);
        let stats = verify(&mut pager, ROOT_PAGE_NUM, 3).expect("valid");
        assert_eq!(stats.depth, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.internal_count, 1);
        assert_eq!(stats.row_count, 14);
    }

    #[test]
    fn test_detects_bad_parent_pointer() {
        let mut pager = build_tree(1..=14);
        set_node_parent(pager.get_page(1).expect("page"), 5);

        let violation = verify(&mut pager, ROOT_PAGE_NUM, 3).expect_err("broken parent");
        assert_eq!(violation.page_num, 1);
        assert!(violation.message.contains("parent pointer"));
    }

    #[test]
    fn test_detects_stale_separator_key() {
        let mut pager = build_tree(1..=14);
        InternalNode::new(pager.get_page(0).expect("root"))
            .expect("internal root")
            .set_key(0, 6)
            .expect("set key");

        let violation = verify(&mut pager, ROOT_PAGE_NUM, 3).expect_err("stale key");
        assert_eq!(violation.page_num, 2);
    }

    #[test]
    fn test_detects_broken_leaf_chain() {
        let mut pager = build_tree(1..=14);
        LeafNode::new(pager.get_page(2).expect("page"))
            .expect("leaf")
            .set_next_leaf(0);

        let violation = verify(&mut pager, ROOT_PAGE_NUM, 3).expect_err("broken chain");
        assert_eq!(violation.page_num, 2);
        assert!(violation.message.contains("next leaf"));
    }

    #[test]
    fn test_detects_fan_out_over_limit() {
        let mut pager = build_tree(1..=40);
        let violation = verify(&mut pager, ROOT_PAGE_NUM, 1).expect_err("too many keys");
        assert!(violation.message.contains("internal node holds"));
    }
}
