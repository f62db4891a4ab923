//! B+tree insert and lookup over a pager.
//!
//! The root always lives at page 0. When the root splits, its contents move to a
//! freshly allocated page and page 0 is rewritten as the new internal root, so
//! the root page number never changes for the life of a file.
//!
//! Pages are never freed, so the only resource an insert can run out of is page
//! numbers. `insert` works out how many pages its split cascade needs before it
//! touches anything and fails with `TableFull` up front, which keeps every
//! insert all-or-nothing.

use crate::storage::btree::cursor::Cursor;
use crate::storage::btree::node::{
    INTERNAL_NODE_MAX_CELLS_LIMIT, InternalNode, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT, LeafNode, NodeError, NodeType, is_node_root, node_parent,
    node_type, set_node_parent, set_node_root,
};
use crate::storage::page::PageNum;
use crate::storage::pager::{Pager, PagerError};
use crate::types::{Row, RowError};

/// Page number of the root node.
pub const ROOT_PAGE_NUM: PageNum = 0;

/// A B+tree keyed by `u32`, storing one `Row` per key.
pub struct BTree<'a> {
    pager: &'a mut Pager,
    root_page: PageNum,
    internal_max_cells: u32,
}

impl<'a> BTree<'a> {
    /// Wrap `pager`. Internal nodes split once they hold `internal_max_cells`
    /// keys and need another.
    pub const fn new(pager: &'a mut Pager, internal_max_cells: u32) -> Self {
        Self {
            pager,
            root_page: ROOT_PAGE_NUM,
            internal_max_cells,
        }
    }

    #[must_use]
    pub const fn root_page(&self) -> PageNum {
        self.root_page
    }

    /// Write an empty root leaf if the pager holds no pages yet.
    ///
    /// Returns whether a root was created.
    pub fn initialize_root(&mut self) -> Result<bool, BTreeError> {
        if self.pager.num_pages() > 0 {
            return Ok(false);
        }

        let page = self.pager.get_page(self.root_page)?;
        let mut root = LeafNode::initialize(page);
        root.set_root(true);
        root.set_parent(0);
        Ok(true)
    }

    /// Upper bound on how many levels a descent may take before the tree is
    /// considered corrupt. A well-formed tree never has more levels than pages.
    const fn descent_limit(&self) -> u32 {
        self.pager.max_pages()
    }

    /// Position a cursor at `key`, or at the slot where `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor, BTreeError> {
        let mut page_num = self.root_page;
        for _ in 0..=self.descent_limit() {
            let page = self.pager.get_page(page_num)?;
            match node_type(page)? {
                NodeType::Internal => {
                    let node = InternalNode::new(&*page)?;
                    page_num = node.child(node.find_child(key)?)?;
                }
                NodeType::Leaf => {
                    let cell_num = match LeafNode::new(&*page)?.find(key)? {
                        Ok(index) | Err(index) => index,
                    };
                    return Ok(Cursor {
                        page_num,
                        cell_num,
                        end_of_table: false,
                    });
                }
            }
        }
        Err(BTreeError::TreeTooDeep { page_num })
    }

    /// Position a cursor at the first row.
    pub fn start(&mut self) -> Result<Cursor, BTreeError> {
        let mut cursor = self.find(0)?;
        let page = self.pager.get_page(cursor.page_num)?;
        cursor.end_of_table = LeafNode::new(&*page)?.num_cells() == 0;
        Ok(cursor)
    }

    /// Look up the row stored under `key`.
    pub fn get(&mut self, key: u32) -> Result<Option<Row>, BTreeError> {
        let cursor = self.find(key)?;
        let page = self.pager.get_page(cursor.page_num)?;
        let leaf = LeafNode::new(&*page)?;
        if cursor.cell_num < leaf.num_cells() && leaf.key(cursor.cell_num)? == key {
            return Ok(Some(Row::deserialize(leaf.value(cursor.cell_num)?)?));
        }
        Ok(None)
    }

    /// Insert `row` under `key`.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if `key` is already present
    /// - `TableFull` if the splits this insert needs would exceed the page cap
    ///
    /// Both leave the tree untouched.
    pub fn insert(&mut self, key: u32, row: &Row) -> Result<(), BTreeError> {
        let cursor = self.find(key)?;

        let page = self.pager.get_page(cursor.page_num)?;
        let leaf = LeafNode::new(&*page)?;
        if cursor.cell_num < leaf.num_cells() && leaf.key(cursor.cell_num)? == key {
            return Err(BTreeError::DuplicateKey(key));
        }

        if !leaf.is_full() {
            let num_cells = leaf.num_cells();
            let mut leaf = LeafNode::new(page)?;
            leaf.shift_cells_right(cursor.cell_num)?;
            leaf.set_key(cursor.cell_num, key)?;
            row.serialize_into(leaf.value_mut(cursor.cell_num)?)?;
            leaf.set_num_cells(num_cells + 1);
            return Ok(());
        }

        let needed = self.pages_needed_for_split(cursor.page_num)?;
        if self.pager.num_pages() + needed > self.pager.max_pages() {
            return Err(BTreeError::TableFull {
                max_pages: self.pager.max_pages(),
            });
        }

        self.leaf_split_and_insert(cursor, key, row)
    }

    /// Pages a split starting at the full leaf `leaf_page` will allocate: one
    /// for the new leaf, one per full ancestor that splits in turn, and one more
    /// if the cascade reaches the root.
    fn pages_needed_for_split(&mut self, leaf_page: PageNum) -> Result<u32, BTreeError> {
        let mut needed = 1;
        let mut page_num = leaf_page;
        for _ in 0..=self.descent_limit() {
            let page = self.pager.get_page(page_num)?;
            if is_node_root(page) {
                return Ok(needed + 1);
            }

            let parent = node_parent(page);
            let parent_page = self.pager.get_page(parent)?;
            if InternalNode::new(&*parent_page)?.num_keys() < self.internal_max_cells {
                return Ok(needed);
            }
            needed += 1;
            page_num = parent;
        }
        Err(BTreeError::TreeTooDeep { page_num })
    }

    /// Split the full leaf under `cursor` into itself and a new right sibling,
    /// placing the new cell in whichever half it sorts into.
    fn leaf_split_and_insert(
        &mut self,
        cursor: Cursor,
        key: u32,
        row: &Row,
    ) -> Result<(), BTreeError> {
        let old_page = cursor.page_num;
        let old_snapshot = self.pager.get_page(old_page)?.clone();
        let old = LeafNode::new(&old_snapshot)?;
        let old_max = old.max_key()?;

        let new_page = self.pager.allocate_page()?;
        {
            let mut new_leaf = LeafNode::initialize(self.pager.get_page(new_page)?);
            new_leaf.set_parent(old.parent());
            new_leaf.set_next_leaf(old.next_leaf());
        }

        // Lay out the existing cells plus the new one in key order, the first
        // LEFT_SPLIT_COUNT in the old leaf and the rest in the new one.
        for i in 0..=LEAF_NODE_MAX_CELLS {
            let (dest_page, index) = if i >= LEAF_NODE_LEFT_SPLIT_COUNT {
                (new_page, i - LEAF_NODE_LEFT_SPLIT_COUNT)
            } else {
                (old_page, i)
            };
            let mut dest = LeafNode::new(self.pager.get_page(dest_page)?)?;

            if i == cursor.cell_num {
                dest.set_key(index, key)?;
                row.serialize_into(dest.value_mut(index)?)?;
            } else if i > cursor.cell_num {
                dest.set_cell(index, old.cell(i - 1)?)?;
            } else {
                dest.set_cell(index, old.cell(i)?)?;
            }
        }

        {
            let mut left = LeafNode::new(self.pager.get_page(old_page)?)?;
            left.set_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT);
            left.set_next_leaf(new_page);
        }
        LeafNode::new(self.pager.get_page(new_page)?)?.set_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT);

        tracing::debug!("split leaf {old_page} into {old_page} and {new_page}");

        if old.is_root() {
            return self.create_new_root(new_page);
        }

        let parent = old.parent();
        let new_max = self.subtree_max_key(old_page)?;
        self.update_internal_node_key(parent, old_max, new_max)?;
        self.internal_node_insert(parent, new_page)
    }

    /// Grow the tree by one level.
    ///
    /// The current root's contents move to a new page that becomes the left
    /// child, and page 0 is rewritten as an internal root over that copy and
    /// `right_child`.
    fn create_new_root(&mut self, right_child: PageNum) -> Result<(), BTreeError> {
        let root_snapshot = self.pager.get_page(self.root_page)?.clone();
        let left_child = self.pager.allocate_page()?;
        {
            let left = self.pager.get_page(left_child)?;
            *left = root_snapshot;
            set_node_root(left, false);
            set_node_parent(left, self.root_page);
        }

        // An internal old root takes its children with it.
        let left = self.pager.get_page(left_child)?;
        if node_type(left)? == NodeType::Internal {
            let children = InternalNode::new(&*left)?.children()?;
            for child in children {
                set_node_parent(self.pager.get_page(child)?, left_child);
            }
        }

        let left_max = self.subtree_max_key(left_child)?;
        {
            let mut root = InternalNode::initialize(self.pager.get_page(self.root_page)?);
            root.set_root(true);
            root.set_num_keys(1)?;
            root.set_child(0, left_child)?;
            root.set_key(0, left_max)?;
            root.set_right_child(right_child);
        }
        set_node_parent(self.pager.get_page(right_child)?, self.root_page);

        tracing::debug!(
            "created new root over pages {left_child} and {right_child} (separator {left_max})"
        );
        Ok(())
    }

    /// Replace the key entry `old_key` in internal node `page_num` with `new_key`.
    ///
    /// Nothing changes if `old_key` belongs to the right child, which has no key
    /// entry.
    fn update_internal_node_key(
        &mut self,
        page_num: PageNum,
        old_key: u32,
        new_key: u32,
    ) -> Result<(), BTreeError> {
        let mut node = InternalNode::new(self.pager.get_page(page_num)?)?;
        let index = node.find_child(old_key)?;
        if index < node.num_keys() {
            node.set_key(index, new_key)?;
        }
        Ok(())
    }

    /// Attach `child` to the internal node `parent` in key order.
    fn internal_node_insert(&mut self, parent: PageNum, child: PageNum) -> Result<(), BTreeError> {
        let child_max = self.subtree_max_key(child)?;

        let node = InternalNode::new(&*self.pager.get_page(parent)?)?;
        let num_keys = node.num_keys();
        let right_child = node.right_child();
        if num_keys >= self.internal_max_cells {
            return self.internal_node_split_and_insert(parent, child);
        }

        let right_max = self.subtree_max_key(right_child)?;
        let mut node = InternalNode::new(self.pager.get_page(parent)?)?;
        if child_max > right_max {
            // The old right child becomes the last keyed cell.
            node.set_num_keys(num_keys + 1)?;
            node.set_child(num_keys, right_child)?;
            node.set_key(num_keys, right_max)?;
            node.set_right_child(child);
        } else {
            let index = node.find_child(child_max)?;
            node.shift_cells_right(index)?;
            node.set_num_keys(num_keys + 1)?;
            node.set_child(index, child)?;
            node.set_key(index, child_max)?;
        }

        set_node_parent(self.pager.get_page(child)?, parent);
        Ok(())
    }

    /// Split the full internal node `parent` while adding `child` to it.
    ///
    /// The children and the new one are laid out in key order; the first half
    /// stays in `parent` and the second half moves to a new internal page. In
    /// each half the last child becomes the right child.
    fn internal_node_split_and_insert(
        &mut self,
        parent: PageNum,
        child: PageNum,
    ) -> Result<(), BTreeError> {
        let child_max = self.subtree_max_key(child)?;
        // The new child was split off one of parent's children and is not
        // attached yet, so it may hold the subtree's true maximum.
        let old_max = self.subtree_max_key(parent)?.max(child_max);

        let snapshot = self.pager.get_page(parent)?.clone();
        let node = InternalNode::new(&snapshot)?;
        let mut entries = Vec::with_capacity(node.num_keys() as usize + 2);
        for i in 0..node.num_keys() {
            entries.push((node.child(i)?, node.key(i)?));
        }
        let right_child = node.right_child();
        entries.push((right_child, self.subtree_max_key(right_child)?));
        let at = entries.partition_point(|&(_, max)| max < child_max);
        entries.insert(at, (child, child_max));

        let new_page = self.pager.allocate_page()?;
        let (left, right) = entries.split_at(entries.len().div_ceil(2));
        self.write_internal_node(parent, left)?;
        self.write_internal_node(new_page, right)?;

        tracing::debug!(
            "split internal node {parent} into {parent} ({} children) and {new_page} ({} children)",
            left.len(),
            right.len()
        );

        if node.is_root() {
            return self.create_new_root(new_page);
        }

        let grandparent = node.parent();
        set_node_parent(self.pager.get_page(new_page)?, grandparent);
        let left_max = self.subtree_max_key(parent)?;
        self.update_internal_node_key(grandparent, old_max, left_max)?;
        self.internal_node_insert(grandparent, new_page)
    }

    /// Rewrite `page_num` as a non-root internal node over `entries` and point
    /// every child back at it. The last entry becomes the right child.
    fn write_internal_node(
        &mut self,
        page_num: PageNum,
        entries: &[(PageNum, u32)],
    ) -> Result<(), BTreeError> {
        let ((right_child, _), keyed) = entries.split_last().ok_or(NodeError::EmptyNode)?;
        {
            let mut node = InternalNode::initialize(self.pager.get_page(page_num)?);
            let num_keys = u32::try_from(keyed.len()).map_err(|_| NodeError::CellOutOfBounds {
                cell_num: u32::MAX,
                max_cells: INTERNAL_NODE_MAX_CELLS_LIMIT,
            })?;
            node.set_num_keys(num_keys)?;
            for (i, &(child, key)) in (0u32..).zip(keyed) {
                node.set_child(i, child)?;
                node.set_key(i, key)?;
            }
            node.set_right_child(*right_child);
        }
        for &(child, _) in entries {
            set_node_parent(self.pager.get_page(child)?, page_num);
        }
        Ok(())
    }

    /// Largest key anywhere under `page_num`, found by following right
    /// children down to a leaf.
    pub fn subtree_max_key(&mut self, page_num: PageNum) -> Result<u32, BTreeError> {
        let mut current = page_num;
        for _ in 0..=self.descent_limit() {
            let page = self.pager.get_page(current)?;
            match node_type(page)? {
                NodeType::Internal => current = InternalNode::new(&*page)?.right_child(),
                NodeType::Leaf => return Ok(LeafNode::new(&*page)?.max_key()?),
            }
        }
        Err(BTreeError::TreeTooDeep { page_num: current })
    }

    /// Render the tree structure for debugging.
    pub fn dump_tree(&mut self) -> Result<String, BTreeError> {
        let mut out = String::new();
        self.dump_node(self.root_page, 0, &mut out)?;
        Ok(out)
    }

    fn dump_node(
        &mut self,
        page_num: PageNum,
        level: u32,
        out: &mut String,
    ) -> Result<(), BTreeError> {
        if level > self.descent_limit() {
            return Err(BTreeError::TreeTooDeep { page_num });
        }

        let indent = "  ".repeat(level as usize);
        let page = self.pager.get_page(page_num)?;
        match node_type(page)? {
            NodeType::Leaf => {
                let leaf = LeafNode::new(&*page)?;
                let num_cells = leaf.num_cells();
                out.push_str(&format!("{indent}- leaf (size {num_cells})\n"));
                for i in 0..num_cells {
                    out.push_str(&format!("{indent}  - {}\n", leaf.key(i)?));
                }
            }
            NodeType::Internal => {
                let node = InternalNode::new(&*page)?;
                let num_keys = node.num_keys();
                let mut cells = Vec::with_capacity(num_keys as usize);
                for i in 0..num_keys {
                    cells.push((node.child(i)?, node.key(i)?));
                }
                let right_child = node.right_child();

                out.push_str(&format!("{indent}- internal (size {num_keys})\n"));
                for (child, key) in cells {
                    self.dump_node(child, level + 1, out)?;
                    out.push_str(&format!("{indent}  - key {key}\n"));
                }
                self.dump_node(right_child, level + 1, out)?;
            }
        }
        Ok(())
    }
}

/// Errors that can occur during B+tree operations.
#[derive(Debug)]
pub enum BTreeError {
    /// Pager or storage failure.
    Pager(PagerError),
    /// Malformed node contents.
    Node(NodeError),
    /// Row could not be encoded or decoded.
    Row(RowError),
    /// The key is already in the tree.
    DuplicateKey(u32),
    /// Splitting for this insert would need more pages than the cap allows.
    TableFull { max_pages: u32 },
    /// Descent went deeper than the tree has pages, so the links form a cycle.
    TreeTooDeep { page_num: PageNum },
}

impl std::fmt::Display for BTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pager(e) => write!(f, "pager error: {e}"),
            Self::Node(e) => write!(f, "node error: {e}"),
            Self::Row(e) => write!(f, "row error: {e}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key {key}"),
            Self::TableFull { max_pages } => write!(f, "table full ({max_pages} pages)"),
            Self::TreeTooDeep { page_num } => {
                write!(f, "tree descent did not reach a leaf (stopped at page {page_num})")
            }
        }
    }
}

impl std::error::Error for BTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pager(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::Row(e) => Some(e),
            Self::DuplicateKey(_) | Self::TableFull { .. } | Self::TreeTooDeep { .. } => None,
        }
    }
}

impl From<PagerError> for BTreeError {
    fn from(e: PagerError) -> Self {
        Self::Pager(e)
    }
}

impl From<NodeError> for BTreeError {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}

impl From<RowError> for BTreeError {
    fn from(e: RowError) -> Self {
        Self::Row(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::btree::invariants::verify;
    use crate::storage::memory::MemoryStorage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn open_pager(max_pages: u32) -> Pager {
        let mut pager = Pager::open(Box::new(MemoryStorage::new()), max_pages).expect("open pager");
        BTree::new(&mut pager, 3)
            .initialize_root()
            .expect("initialize root");
        pager
    }

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{id}"), format!("person{id}@example.com")).expect("valid row")
    }

    fn insert_all(tree: &mut BTree<'_>, keys: impl IntoIterator<Item = u32>) {
        for key in keys {
            tree.insert(key, &row(key)).expect("insert");
        }
    }

    fn scan_keys(tree: &mut BTree<'_>) -> Vec<u32> {
        let mut cursor = tree.start().expect("start");
        let mut keys = Vec::new();
        while !cursor.is_end_of_table() {
            keys.push(cursor.key(tree.pager).expect("key"));
            cursor.advance(tree.pager).expect("advance");
        }
        keys
    }

    #[test]
    fn test_initialize_root_once() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        assert!(!tree.initialize_root().expect("initialize"));

        let cursor = tree.start().expect("start");
        assert!(cursor.is_end_of_table());
        assert_eq!(cursor.page_num(), ROOT_PAGE_NUM);
        assert!(is_node_root(tree.pager.get_page(0).expect("root")));
    }

    #[test]
    fn test_insert_out_of_order_scans_sorted() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, [5, 1, 9, 3, 7]);

        assert_eq!(scan_keys(&mut tree), vec![1, 3, 5, 7, 9]);
        assert_eq!(tree.pager.num_pages(), 1);
    }

    #[test]
    fn test_find_positions() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, [10, 20, 30]);

        assert_eq!(tree.find(20).expect("find").cell_num(), 1);
        assert_eq!(tree.find(25).expect("find").cell_num(), 2);
        assert_eq!(tree.find(99).expect("find").cell_num(), 3);
    }

    #[test]
    fn test_duplicate_key_leaves_row_untouched() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        tree.insert(1, &row(1)).expect("insert");

        let other = Row::new(1, "someone", "else@example.com").expect("valid row");
        assert!(matches!(
            tree.insert(1, &other),
            Err(BTreeError::DuplicateKey(1))
        ));
        assert_eq!(tree.get(1).expect("get"), Some(row(1)));
        assert_eq!(scan_keys(&mut tree), vec![1]);
    }

    #[test]
    fn test_get_missing_key() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        assert_eq!(tree.get(4).expect("get"), None);

        insert_all(&mut tree, 1..=30);
        assert_eq!(tree.get(31).expect("get"), None);
        assert_eq!(tree.get(17).expect("get"), Some(row(17)));
    }

    #[test]
    fn test_first_split_promotes_root() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, 1..=LEAF_NODE_MAX_CELLS + 1);

        let root = InternalNode::new(&*tree.pager.get_page(0).expect("root"))
            .expect("internal root");
        assert!(root.is_root());
        assert_eq!(root.num_keys(), 1);
        assert_eq!(root.key(0), Ok(7));
        let (left, right) = (root.child(0).expect("left"), root.right_child());
        // The split allocates the right leaf first, then the copy of the old root.
        assert_eq!((left, right), (2, 1));

        let left_leaf = LeafNode::new(&*tree.pager.get_page(left).expect("left")).expect("leaf");
        assert_eq!(left_leaf.num_cells(), LEAF_NODE_LEFT_SPLIT_COUNT);
        assert_eq!(left_leaf.next_leaf(), right);
        assert_eq!(left_leaf.parent(), 0);
        assert!(!left_leaf.is_root());

        let right_leaf = LeafNode::new(&*tree.pager.get_page(right).expect("right")).expect("leaf");
        assert_eq!(right_leaf.num_cells(), LEAF_NODE_RIGHT_SPLIT_COUNT);
        assert_eq!(right_leaf.next_leaf(), 0);
        assert_eq!(right_leaf.parent(), 0);

        assert_eq!(
            scan_keys(&mut tree),
            (1..=LEAF_NODE_MAX_CELLS + 1).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_split_places_new_key_in_left_half() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, (1..=LEAF_NODE_MAX_CELLS).map(|k| k * 10));
        tree.insert(15, &row(15)).expect("insert");

        let root = InternalNode::new(&*tree.pager.get_page(0).expect("root"))
            .expect("internal root");
        assert_eq!(root.key(0), Ok(60));
        assert_eq!(tree.get(15).expect("get"), Some(row(15)));

        let mut expected: Vec<u32> = (1..=LEAF_NODE_MAX_CELLS).map(|k| k * 10).collect();
        expected.insert(1, 15);
        assert_eq!(scan_keys(&mut tree), expected);
    }

    #[test]
    fn test_dump_tree() {
        let mut pager = open_pager(10);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, [2, 1]);
        assert_eq!(
            tree.dump_tree().expect("dump"),
            "- leaf (size 2)\n  - 1\n  - 2\n"
        );

        insert_all(&mut tree, 3..=14);
        let dump = tree.dump_tree().expect("dump");
        let mut expected = String::from("- internal (size 1)\n  - leaf (size 7)\n");
        for key in 1..=7 {
            expected.push_str(&format!("    - {key}\n"));
        }
        expected.push_str("  - key 7\n  - leaf (size 7)\n");
        for key in 8..=14 {
            expected.push_str(&format!("    - {key}\n"));
        }
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_internal_splits_keep_tree_valid() {
        let mut pager = open_pager(100);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, 1..=200);

        let stats = verify(tree.pager, ROOT_PAGE_NUM, 3).expect("valid tree");
        assert!(stats.depth >= 3, "depth was {}", stats.depth);
        assert_eq!(stats.row_count, 200);
        assert_eq!(scan_keys(&mut tree), (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn test_descending_inserts_keep_tree_valid() {
        let mut pager = open_pager(100);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, (1..=150).rev());

        let stats = verify(tree.pager, ROOT_PAGE_NUM, 3).expect("valid tree");
        assert_eq!(stats.row_count, 150);
        assert_eq!(scan_keys(&mut tree), (1..=150).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffled_inserts_with_minimum_fan_out() {
        let mut keys: Vec<u32> = (0..300).map(|k| k * 3 + 1).collect();
        keys.shuffle(&mut StdRng::seed_from_u64(7));

        let mut pager = Pager::open(Box::new(MemoryStorage::new()), 200).expect("open pager");
        let mut tree = BTree::new(&mut pager, 2);
        tree.initialize_root().expect("initialize root");
        for (i, &key) in keys.iter().enumerate() {
            tree.insert(key, &row(key)).expect("insert");
            if i % 25 == 0 {
                verify(tree.pager, ROOT_PAGE_NUM, 2).expect("valid tree");
            }
        }

        let stats = verify(tree.pager, ROOT_PAGE_NUM, 2).expect("valid tree");
        assert_eq!(stats.row_count, 300);
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(scan_keys(&mut tree), sorted);
    }

    #[test]
    fn test_table_full_is_checked_before_mutation() {
        let mut pager = open_pager(2);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, 1..=LEAF_NODE_MAX_CELLS);

        let before = tree.dump_tree().expect("dump");
        assert!(matches!(
            tree.insert(100, &row(100)),
            Err(BTreeError::TableFull { max_pages: 2 })
        ));
        assert_eq!(tree.pager.num_pages(), 1);
        assert_eq!(tree.dump_tree().expect("dump"), before);
    }

    #[test]
    fn test_fills_page_budget_exactly() {
        let mut pager = open_pager(40);
        let mut tree = BTree::new(&mut pager, 3);

        let mut inserted = 0;
        loop {
            match tree.insert(inserted + 1, &row(inserted + 1)) {
                Ok(()) => inserted += 1,
                Err(BTreeError::TableFull { .. }) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert!(tree.pager.num_pages() <= 40);
        let stats = verify(tree.pager, ROOT_PAGE_NUM, 3).expect("valid tree");
        assert_eq!(stats.row_count, inserted);
        assert!(matches!(
            tree.insert(inserted + 1, &row(inserted + 1)),
            Err(BTreeError::TableFull { .. })
        ));
    }

    #[test]
    fn test_subtree_max_key() {
        let mut pager = open_pager(100);
        let mut tree = BTree::new(&mut pager, 3);
        insert_all(&mut tree, 1..=60);

        assert_eq!(tree.subtree_max_key(ROOT_PAGE_NUM).expect("max"), 60);
    }
}
