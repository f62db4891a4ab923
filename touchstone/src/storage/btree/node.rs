//! B+tree node layout and typed accessors.
//!
//! Every page holds one node. All nodes start with a common header:
//!
//! | field       | offset | size |
//! |-------------|--------|------|
//! | node type   | 0      | 1    |
//! | is root     | 1      | 1    |
//! | parent page | 2      | 4    |
//!
//! Leaf nodes follow it with `num_cells` (4) and `next_leaf` (4, 0 = none), then
//! an array of `(key: u32, row: [u8; ROW_SIZE])` cells sorted by key.
//!
//! Internal nodes follow it with `num_keys` (4) and `right_child` (4), then an
//! array of `(child: u32, key: u32)` cells. `key[i]` is the largest key in the
//! subtree under `child[i]`; everything larger lives under `right_child`.
//!
//! The accessors never trust a caller-computed offset: cell and child indexes
//! are checked against the node's capacity and a typed view can only be built
//! over a page carrying the matching type tag.

use std::fmt;

use crate::storage::page::{PAGE_SIZE, Page, PageNum};
use crate::types::ROW_SIZE;

// Common node header.
pub const NODE_TYPE_SIZE: usize = 1;
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = 1;
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
pub const PARENT_POINTER_SIZE: usize = 4;
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

// Leaf node header.
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NEXT_LEAF_SIZE: usize = 4;
pub const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE + LEAF_NODE_NEXT_LEAF_SIZE;

// Leaf node body.
pub const LEAF_NODE_KEY_SIZE: usize = 4;
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
#[allow(clippy::cast_possible_truncation)]
pub const LEAF_NODE_MAX_CELLS: u32 = (LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE) as u32;

/// Cells kept in the old leaf when a full leaf splits (the larger half).
pub const LEAF_NODE_LEFT_SPLIT_COUNT: u32 = (LEAF_NODE_MAX_CELLS + 1).div_ceil(2);
/// Cells moved to the new leaf when a full leaf splits.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: u32 = (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_LEFT_SPLIT_COUNT;

// Internal node header.
pub const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;

// Internal node body.
pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_KEY_SIZE: usize = 4;
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
/// Most cells an internal node can physically hold in one page.
#[allow(clippy::cast_possible_truncation)]
pub const INTERNAL_NODE_MAX_CELLS_LIMIT: u32 =
    ((PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE) as u32;

/// Node type tag stored in the first byte of every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Internal = 0,
    Leaf = 1,
}

impl TryFrom<u8> for NodeType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Internal),
            1 => Ok(Self::Leaf),
            _ => Err(value),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Leaf => write!(f, "leaf"),
        }
    }
}

/// Read the node type tag.
pub fn node_type(page: &Page) -> Result<NodeType, NodeError> {
    NodeType::try_from(page.read_u8(NODE_TYPE_OFFSET)).map_err(NodeError::InvalidNodeType)
}

pub fn set_node_type(page: &mut Page, node_type: NodeType) {
    page.write_u8(NODE_TYPE_OFFSET, node_type as u8);
}

#[must_use]
pub fn is_node_root(page: &Page) -> bool {
    page.read_u8(IS_ROOT_OFFSET) != 0
}

pub fn set_node_root(page: &mut Page, is_root: bool) {
    page.write_u8(IS_ROOT_OFFSET, u8::from(is_root));
}

#[must_use]
pub fn node_parent(page: &Page) -> PageNum {
    page.read_u32(PARENT_POINTER_OFFSET)
}

pub fn set_node_parent(page: &mut Page, parent: PageNum) {
    page.write_u32(PARENT_POINTER_OFFSET, parent);
}

/// Largest key recorded in the node itself: the last cell of a leaf, or the last
/// key entry of an internal node.
///
/// For an internal node this is the maximum of its second-to-last subtree, not
/// of the whole node; `BTree::subtree_max_key` descends for the true maximum.
pub fn node_max_key(page: &Page) -> Result<u32, NodeError> {
    match node_type(page)? {
        NodeType::Leaf => LeafNode::new(page)?.max_key(),
        NodeType::Internal => InternalNode::new(page)?.max_key(),
    }
}

/// Typed view of a leaf node.
///
/// `P` is `&Page` for reads or `&mut Page` for writes.
#[derive(Debug)]
pub struct LeafNode<P> {
    page: P,
}

impl<P: AsRef<Page>> LeafNode<P> {
    /// View `page` as a leaf, failing if it carries another type tag.
    pub fn new(page: P) -> Result<Self, NodeError> {
        match node_type(page.as_ref())? {
            NodeType::Leaf => Ok(Self { page }),
            actual => Err(NodeError::WrongNodeType {
                expected: NodeType::Leaf,
                actual,
            }),
        }
    }

    fn page(&self) -> &Page {
        self.page.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        is_node_root(self.page())
    }

    #[must_use]
    pub fn parent(&self) -> PageNum {
        node_parent(self.page())
    }

    #[must_use]
    pub fn num_cells(&self) -> u32 {
        self.page().read_u32(LEAF_NODE_NUM_CELLS_OFFSET)
    }

    /// Page number of the next leaf in key order (0 = this is the last leaf).
    #[must_use]
    pub fn next_leaf(&self) -> PageNum {
        self.page().read_u32(LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    /// Whether the leaf has no room for another cell.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.num_cells() >= LEAF_NODE_MAX_CELLS
    }

    /// The full `(key, row)` cell bytes.
    pub fn cell(&self, cell_num: u32) -> Result<&[u8], NodeError> {
        let offset = leaf_cell_offset(cell_num)?;
        Ok(self.page().read_bytes(offset, LEAF_NODE_CELL_SIZE))
    }

    pub fn key(&self, cell_num: u32) -> Result<u32, NodeError> {
        let offset = leaf_cell_offset(cell_num)?;
        Ok(self.page().read_u32(offset + LEAF_NODE_KEY_OFFSET))
    }

    /// The serialized row stored in a cell.
    pub fn value(&self, cell_num: u32) -> Result<&[u8], NodeError> {
        let offset = leaf_cell_offset(cell_num)?;
        Ok(self
            .page()
            .read_bytes(offset + LEAF_NODE_VALUE_OFFSET, LEAF_NODE_VALUE_SIZE))
    }

    /// Key of the last cell.
    pub fn max_key(&self) -> Result<u32, NodeError> {
        match self.num_cells() {
            0 => Err(NodeError::EmptyNode),
            n => self.key(n - 1),
        }
    }

    /// Binary search for `key`.
    ///
    /// `Ok(i)` if cell `i` holds the key, otherwise `Err(i)` with the index of
    /// the first larger key (or `num_cells` when every key is smaller).
    pub fn find(&self, key: u32) -> Result<Result<u32, u32>, NodeError> {
        let mut min_index = 0;
        let mut one_past_max_index = self.num_cells();
        while min_index != one_past_max_index {
            let index = min_index + (one_past_max_index - min_index) / 2;
            let key_at_index = self.key(index)?;
            if key == key_at_index {
                return Ok(Ok(index));
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        Ok(Err(min_index))
    }
}

impl<P: AsRef<Page> + AsMut<Page>> LeafNode<P> {
    /// Reset `page` to an empty, non-root leaf with no next leaf.
    ///
    /// The parent pointer is left untouched.
    pub fn initialize(mut page: P) -> Self {
        let p = page.as_mut();
        set_node_type(p, NodeType::Leaf);
        set_node_root(p, false);
        p.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, 0);
        p.write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, 0);
        Self { page }
    }

    fn page_mut(&mut self) -> &mut Page {
        self.page.as_mut()
    }

    pub fn set_root(&mut self, is_root: bool) {
        set_node_root(self.page_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageNum) {
        set_node_parent(self.page_mut(), parent);
    }

    pub fn set_num_cells(&mut self, num_cells: u32) {
        self.page_mut()
            .write_u32(LEAF_NODE_NUM_CELLS_OFFSET, num_cells);
    }

    pub fn set_next_leaf(&mut self, next_leaf: PageNum) {
        self.page_mut()
            .write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, next_leaf);
    }

    pub fn set_key(&mut self, cell_num: u32, key: u32) -> Result<(), NodeError> {
        let offset = leaf_cell_offset(cell_num)?;
        self.page_mut().write_u32(offset + LEAF_NODE_KEY_OFFSET, key);
        Ok(())
    }

    /// Mutable access to the row bytes of a cell.
    pub fn value_mut(&mut self, cell_num: u32) -> Result<&mut [u8], NodeError> {
        let offset = leaf_cell_offset(cell_num)?;
        Ok(self
            .page_mut()
            .bytes_mut(offset + LEAF_NODE_VALUE_OFFSET, LEAF_NODE_VALUE_SIZE))
    }

    /// Overwrite a whole cell with bytes previously read by `cell`.
    pub fn set_cell(&mut self, cell_num: u32, cell: &[u8]) -> Result<(), NodeError> {
        if cell.len() != LEAF_NODE_CELL_SIZE {
            return Err(NodeError::WrongCellSize(cell.len()));
        }
        let offset = leaf_cell_offset(cell_num)?;
        self.page_mut().write_bytes(offset, cell);
        Ok(())
    }

    /// Move cells `[at, num_cells)` one slot to the right, leaving slot `at`
    /// free. The cell count is not changed.
    pub fn shift_cells_right(&mut self, at: u32) -> Result<(), NodeError> {
        let num_cells = self.num_cells();
        if num_cells >= LEAF_NODE_MAX_CELLS {
            return Err(NodeError::CellOutOfBounds {
                cell_num: num_cells,
                max_cells: LEAF_NODE_MAX_CELLS,
            });
        }
        if at < num_cells {
            let src = leaf_cell_offset(at)?;
            let len = (num_cells - at) as usize * LEAF_NODE_CELL_SIZE;
            self.page_mut()
                .copy_within(src, src + LEAF_NODE_CELL_SIZE, len);
        }
        Ok(())
    }
}

fn leaf_cell_offset(cell_num: u32) -> Result<usize, NodeError> {
    if cell_num >= LEAF_NODE_MAX_CELLS {
        return Err(NodeError::CellOutOfBounds {
            cell_num,
            max_cells: LEAF_NODE_MAX_CELLS,
        });
    }
    Ok(LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE)
}

/// Typed view of an internal node.
#[derive(Debug)]
pub struct InternalNode<P> {
    page: P,
}

impl<P: AsRef<Page>> InternalNode<P> {
    /// View `page` as an internal node, failing if it carries another type tag.
    pub fn new(page: P) -> Result<Self, NodeError> {
        match node_type(page.as_ref())? {
            NodeType::Internal => Ok(Self { page }),
            actual => Err(NodeError::WrongNodeType {
                expected: NodeType::Internal,
                actual,
            }),
        }
    }

    fn page(&self) -> &Page {
        self.page.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        is_node_root(self.page())
    }

    #[must_use]
    pub fn parent(&self) -> PageNum {
        node_parent(self.page())
    }

    #[must_use]
    pub fn num_keys(&self) -> u32 {
        self.page().read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    #[must_use]
    pub fn right_child(&self) -> PageNum {
        self.page().read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn key(&self, key_num: u32) -> Result<u32, NodeError> {
        let offset = internal_cell_offset(key_num)?;
        Ok(self.page().read_u32(offset + INTERNAL_NODE_CHILD_SIZE))
    }

    /// Child `child_num`, where `child_num == num_keys` means the right child.
    pub fn child(&self, child_num: u32) -> Result<PageNum, NodeError> {
        let num_keys = self.num_keys();
        if child_num > num_keys {
            return Err(NodeError::ChildOutOfBounds {
                child_num,
                num_keys,
            });
        }
        if child_num == num_keys {
            return Ok(self.right_child());
        }
        let offset = internal_cell_offset(child_num)?;
        Ok(self.page().read_u32(offset))
    }

    /// Last key entry.
    pub fn max_key(&self) -> Result<u32, NodeError> {
        match self.num_keys() {
            0 => Err(NodeError::EmptyNode),
            n => self.key(n - 1),
        }
    }

    /// Index of the child that should hold `key`: the first key entry `>= key`,
    /// or `num_keys` (the right child) when every entry is smaller.
    pub fn find_child(&self, key: u32) -> Result<u32, NodeError> {
        let mut min_index = 0;
        let mut max_index = self.num_keys();
        while min_index != max_index {
            let index = min_index + (max_index - min_index) / 2;
            let key_to_right = self.key(index)?;
            if key_to_right >= key {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        Ok(min_index)
    }

    /// All children in order, the right child last.
    pub fn children(&self) -> Result<Vec<PageNum>, NodeError> {
        (0..=self.num_keys()).map(|i| self.child(i)).collect()
    }
}

impl<P: AsRef<Page> + AsMut<Page>> InternalNode<P> {
    /// Reset `page` to an empty, non-root internal node.
    ///
    /// The parent pointer is left untouched. The right child is zeroed; callers
    /// must set it before the node is reachable.
    pub fn initialize(mut page: P) -> Self {
        let p = page.as_mut();
        set_node_type(p, NodeType::Internal);
        set_node_root(p, false);
        p.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, 0);
        p.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, 0);
        Self { page }
    }

    fn page_mut(&mut self) -> &mut Page {
        self.page.as_mut()
    }

    pub fn set_root(&mut self, is_root: bool) {
        set_node_root(self.page_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageNum) {
        set_node_parent(self.page_mut(), parent);
    }

    pub fn set_num_keys(&mut self, num_keys: u32) -> Result<(), NodeError> {
        if num_keys > INTERNAL_NODE_MAX_CELLS_LIMIT {
            return Err(NodeError::CellOutOfBounds {
                cell_num: num_keys,
                max_cells: INTERNAL_NODE_MAX_CELLS_LIMIT,
            });
        }
        self.page_mut()
            .write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys);
        Ok(())
    }

    pub fn set_right_child(&mut self, child: PageNum) {
        self.page_mut()
            .write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, child);
    }

    pub fn set_key(&mut self, key_num: u32, key: u32) -> Result<(), NodeError> {
        let offset = internal_cell_offset(key_num)?;
        self.page_mut()
            .write_u32(offset + INTERNAL_NODE_CHILD_SIZE, key);
        Ok(())
    }

    /// Set child `child_num`, where `child_num == num_keys` means the right child.
    pub fn set_child(&mut self, child_num: u32, child: PageNum) -> Result<(), NodeError> {
        let num_keys = self.num_keys();
        if child_num > num_keys {
            return Err(NodeError::ChildOutOfBounds {
                child_num,
                num_keys,
            });
        }
        if child_num == num_keys {
            self.set_right_child(child);
            return Ok(());
        }
        let offset = internal_cell_offset(child_num)?;
        self.page_mut().write_u32(offset, child);
        Ok(())
    }

    /// Move cells `[at, num_keys)` one slot to the right. The key count is not
    /// changed.
    pub fn shift_cells_right(&mut self, at: u32) -> Result<(), NodeError> {
        let num_keys = self.num_keys();
        if num_keys >= INTERNAL_NODE_MAX_CELLS_LIMIT {
            return Err(NodeError::CellOutOfBounds {
                cell_num: num_keys,
                max_cells: INTERNAL_NODE_MAX_CELLS_LIMIT,
            });
        }
        if at < num_keys {
            let src = internal_cell_offset(at)?;
            let len = (num_keys - at) as usize * INTERNAL_NODE_CELL_SIZE;
            self.page_mut()
                .copy_within(src, src + INTERNAL_NODE_CELL_SIZE, len);
        }
        Ok(())
    }
}

fn internal_cell_offset(cell_num: u32) -> Result<usize, NodeError> {
    if cell_num >= INTERNAL_NODE_MAX_CELLS_LIMIT {
        return Err(NodeError::CellOutOfBounds {
            cell_num,
            max_cells: INTERNAL_NODE_MAX_CELLS_LIMIT,
        });
    }
    Ok(INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE)
}

/// The derived layout sizes, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConstants {
    pub row_size: usize,
    pub common_node_header_size: usize,
    pub leaf_node_header_size: usize,
    pub leaf_node_cell_size: usize,
    pub leaf_node_space_for_cells: usize,
    pub leaf_node_max_cells: u32,
    pub leaf_node_left_split_count: u32,
    pub leaf_node_right_split_count: u32,
    pub internal_node_header_size: usize,
    pub internal_node_cell_size: usize,
}

impl LayoutConstants {
    pub const CURRENT: Self = Self {
        row_size: ROW_SIZE,
        common_node_header_size: COMMON_NODE_HEADER_SIZE,
        leaf_node_header_size: LEAF_NODE_HEADER_SIZE,
        leaf_node_cell_size: LEAF_NODE_CELL_SIZE,
        leaf_node_space_for_cells: LEAF_NODE_SPACE_FOR_CELLS,
        leaf_node_max_cells: LEAF_NODE_MAX_CELLS,
        leaf_node_left_split_count: LEAF_NODE_LEFT_SPLIT_COUNT,
        leaf_node_right_split_count: LEAF_NODE_RIGHT_SPLIT_COUNT,
        internal_node_header_size: INTERNAL_NODE_HEADER_SIZE,
        internal_node_cell_size: INTERNAL_NODE_CELL_SIZE,
    };
}

impl fmt::Display for LayoutConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ROW_SIZE: {}", self.row_size)?;
        writeln!(f, "COMMON_NODE_HEADER_SIZE: {}", self.common_node_header_size)?;
        writeln!(f, "LEAF_NODE_HEADER_SIZE: {}", self.leaf_node_header_size)?;
        writeln!(f, "LEAF_NODE_CELL_SIZE: {}", self.leaf_node_cell_size)?;
        writeln!(f, "LEAF_NODE_SPACE_FOR_CELLS: {}", self.leaf_node_space_for_cells)?;
        writeln!(f, "LEAF_NODE_MAX_CELLS: {}", self.leaf_node_max_cells)?;
        writeln!(f, "LEAF_NODE_LEFT_SPLIT_COUNT: {}", self.leaf_node_left_split_count)?;
        writeln!(f, "LEAF_NODE_RIGHT_SPLIT_COUNT: {}", self.leaf_node_right_split_count)?;
        writeln!(f, "INTERNAL_NODE_HEADER_SIZE: {}", self.internal_node_header_size)?;
        writeln!(f, "INTERNAL_NODE_CELL_SIZE: {}", self.internal_node_cell_size)
    }
}

/// Errors that can occur when working with B+tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Type tag byte is neither internal nor leaf.
    InvalidNodeType(u8),
    /// Page holds a different node type than the operation needs.
    WrongNodeType { expected: NodeType, actual: NodeType },
    /// Cell index past the node's capacity.
    CellOutOfBounds { cell_num: u32, max_cells: u32 },
    /// Child index past `num_keys`.
    ChildOutOfBounds { child_num: u32, num_keys: u32 },
    /// Node has no cells, so it has no max key.
    EmptyNode,
    /// Raw cell bytes of the wrong length.
    WrongCellSize(usize),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeType(v) => write!(f, "invalid node type: 0x{v:02x}"),
            Self::WrongNodeType { expected, actual } => {
                write!(f, "expected {expected} node, found {actual} node")
            }
            Self::CellOutOfBounds {
                cell_num,
                max_cells,
            } => write!(f, "cell {cell_num} out of bounds (max cells: {max_cells})"),
            Self::ChildOutOfBounds {
                child_num,
                num_keys,
            } => write!(f, "child {child_num} out of bounds (num keys: {num_keys})"),
            Self::EmptyNode => write!(f, "node has no keys"),
            Self::WrongCellSize(len) => {
                write!(f, "cell is {len} bytes (expected {LEAF_NODE_CELL_SIZE})")
            }
        }
    }
}

impl std::error::Error for NodeError {}
