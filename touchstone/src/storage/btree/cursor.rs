//! Positional handle into a leaf.

use crate::storage::btree::node::LeafNode;
use crate::storage::btree::tree::BTreeError;
use crate::storage::page::PageNum;
use crate::storage::pager::Pager;
use crate::types::Row;

/// A position inside the tree: a leaf page and a cell index within it.
///
/// `cell_num` may equal the leaf's cell count, meaning "after the last cell",
/// which is a valid insertion point. A cursor does not borrow the pager; every
/// read goes through the `Pager` passed in, so it stays valid only as long as
/// the tree is not modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) page_num: PageNum,
    pub(crate) cell_num: u32,
    pub(crate) end_of_table: bool,
}

impl Cursor {
    #[must_use]
    pub const fn page_num(&self) -> PageNum {
        self.page_num
    }

    #[must_use]
    pub const fn cell_num(&self) -> u32 {
        self.cell_num
    }

    /// Whether the cursor has moved past the last row.
    #[must_use]
    pub const fn is_end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Key of the cell under the cursor.
    pub fn key(&self, pager: &mut Pager) -> Result<u32, BTreeError> {
        let page = pager.get_page(self.page_num)?;
        Ok(LeafNode::new(&*page)?.key(self.cell_num)?)
    }

    /// Decode the row under the cursor.
    pub fn row(&self, pager: &mut Pager) -> Result<Row, BTreeError> {
        let page = pager.get_page(self.page_num)?;
        let leaf = LeafNode::new(&*page)?;
        Ok(Row::deserialize(leaf.value(self.cell_num)?)?)
    }

    /// Step to the next cell, following the leaf chain across pages.
    pub fn advance(&mut self, pager: &mut Pager) -> Result<(), BTreeError> {
        let page = pager.get_page(self.page_num)?;
        let leaf = LeafNode::new(&*page)?;

        self.cell_num += 1;
        if self.cell_num >= leaf.num_cells() {
            match leaf.next_leaf() {
                0 => self.end_of_table = true,
                next => {
                    self.page_num = next;
                    self.cell_num = 0;
                }
            }
        }
        Ok(())
    }
}
