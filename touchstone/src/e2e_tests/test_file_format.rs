//! Test the on-disk byte layout.

use crate::e2e_tests::helpers::*;
use crate::storage::{PAGE_SIZE, PagerError};
use crate::{Table, TableConfig, TableError};

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[test]
fn test_single_leaf_layout() {
    let dir = TestDir::new();
    let mut table = dir.open();
    table.insert(&row(1)).expect("insert");
    table.close().expect("close");

    let bytes = std::fs::read(dir.path()).expect("read file");
    assert_eq!(bytes.len(), PAGE_SIZE);

    // Common header: leaf, root, parent 0.
    assert_eq!(bytes[0], 1);
    assert_eq!(bytes[1], 1);
    assert_eq!(read_u32(&bytes, 2), 0);
    // Leaf header: one cell, no next leaf.
    assert_eq!(read_u32(&bytes, 6), 1);
    assert_eq!(read_u32(&bytes, 10), 0);
    // Cell 0: key then the serialized row.
    assert_eq!(read_u32(&bytes, 14), 1);
    assert_eq!(read_u32(&bytes, 18), 1);
    assert_eq!(&bytes[22..28], b"user1\0");
    assert_eq!(&bytes[18 + 37..18 + 37 + 20], b"person1@example.com\0");
}

#[test]
fn test_internal_root_layout() {
    let dir = TestDir::new();
    let mut table = dir.open();
    insert_all(&mut table, 1..=14);
    table.close().expect("close");

    let bytes = std::fs::read(dir.path()).expect("read file");
    assert_eq!(bytes.len(), 3 * PAGE_SIZE);

    // Page 0 is an internal root with one key.
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[1], 1);
    assert_eq!(read_u32(&bytes, 6), 1);
    let right_child = read_u32(&bytes, 10);
    let left_child = read_u32(&bytes, 14);
    assert_eq!(read_u32(&bytes, 18), 7);
    assert_eq!((left_child, right_child), (2, 1));

    // The left leaf links to the right one, which ends the chain.
    let left = &bytes[2 * PAGE_SIZE..3 * PAGE_SIZE];
    assert_eq!(left[0], 1);
    assert_eq!(left[1], 0);
    assert_eq!(read_u32(left, 2), 0);
    assert_eq!(read_u32(left, 6), 7);
    assert_eq!(read_u32(left, 10), 1);

    let right = &bytes[PAGE_SIZE..2 * PAGE_SIZE];
    assert_eq!(read_u32(right, 6), 7);
    assert_eq!(read_u32(right, 10), 0);
    assert_eq!(read_u32(right, 14), 8);
}

#[test]
fn test_partial_page_is_corrupt() {
    let dir = TestDir::new();
    std::fs::write(dir.path(), vec![0u8; PAGE_SIZE + 7]).expect("write file");

    let err = Table::open_with_config(dir.path(), TableConfig::default()).expect_err("corrupt");
    assert!(matches!(
        err,
        TableError::Pager(PagerError::CorruptFile { file_length }) if file_length == PAGE_SIZE as u64 + 7
    ));
}

#[test]
fn test_unknown_node_type_is_reported() {
    let dir = TestDir::new();
    let mut page = vec![0u8; PAGE_SIZE];
    page[0] = 9;
    std::fs::write(dir.path(), page).expect("write file");

    let mut table = dir.open();
    let err = table.insert(&row(1)).expect_err("bad node type");
    assert!(matches!(
        err,
        TableError::Node(crate::storage::btree::NodeError::InvalidNodeType(9))
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn test_layout_constants_report() {
    let report = crate::storage::btree::LayoutConstants::CURRENT.to_string();
    assert_eq!(
        report,
        "ROW_SIZE: 293\n\
         COMMON_NODE_HEADER_SIZE: 6\n\
         LEAF_NODE_HEADER_SIZE: 14\n\
         LEAF_NODE_CELL_SIZE: 297\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
         LEAF_NODE_MAX_CELLS: 13\n\
         LEAF_NODE_LEFT_SPLIT_COUNT: 7\n\
         LEAF_NODE_RIGHT_SPLIT_COUNT: 7\n\
         INTERNAL_NODE_HEADER_SIZE: 14\n\
         INTERNAL_NODE_CELL_SIZE: 8\n"
    );
}
