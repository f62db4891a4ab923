//! Paged B+tree holding the table's rows.
//!
//! # Structure
//!
//! - Internal nodes: routing keys and child page numbers. Key `i` is the largest
//!   key under child `i`; larger keys live under the right child.
//! - Leaf nodes: `(key, row)` cells in key order, singly linked left to right
//!   for full scans.
//!
//! Every node occupies exactly one page, and the root is always page 0.
//!
//! # Usage
//!
//! ```
//! use touchstone::storage::btree::{BTree, ROOT_PAGE_NUM};
//! use touchstone::storage::{MemoryStorage, Pager};
//! use touchstone::types::Row;
//!
//! let mut pager = Pager::open(Box::new(MemoryStorage::new()), 10).expect("open pager");
//! let mut tree = BTree::new(&mut pager, 3);
//! tree.initialize_root().expect("initialize root");
//!
//! let row = Row::new(1, "ada", "ada@example.com").expect("valid row");
//! tree.insert(row.id(), &row).expect("insert");
//!
//! assert_eq!(tree.get(1).expect("get"), Some(row));
//! assert_eq!(tree.root_page(), ROOT_PAGE_NUM);
//! ```

mod cursor;
pub mod invariants;
mod node;
mod tree;

pub use cursor::Cursor;
pub use invariants::{InvariantViolation, TreeStats, verify};
pub use node::{
    INTERNAL_NODE_MAX_CELLS_LIMIT, InternalNode, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT, LayoutConstants, LeafNode, NodeError, NodeType, node_max_key,
};
pub use tree::{BTree, BTreeError, ROOT_PAGE_NUM};
