//! Test the shape of the tree around leaf and internal splits.

use crate::e2e_tests::helpers::*;
use crate::storage::btree::{LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS};
use crate::TableConfig;

#[test]
fn test_first_leaf_split() {
    let dir = TestDir::new();
    let mut table = dir.open();
    insert_all(&mut table, 1..=LEAF_NODE_MAX_CELLS + 1);

    let stats = table.verify().expect("valid tree");
    assert_eq!(stats.depth, 2);
    assert_eq!(stats.leaf_count, 2);
    assert_eq!(stats.internal_count, 1);
    assert_eq!(table.num_pages(), 3);

    let dump = table.dump_tree().expect("dump");
    let mut lines = dump.lines();
    assert_eq!(lines.next(), Some("- internal (size 1)"));
    assert_eq!(lines.next(), Some("  - leaf (size 7)"));
    assert!(dump.contains(&format!("  - key {LEAF_NODE_LEFT_SPLIT_COUNT}\n")));
    assert_eq!(
        scan_ids(&mut table),
        (1..=LEAF_NODE_MAX_CELLS + 1).collect::<Vec<_>>()
    );
}

#[test]
fn test_root_internal_split() {
    let dir = TestDir::new();
    let mut table = dir.open();

    // Five leaves need four keys, one more than the default fan-out allows.
    insert_all(&mut table, 1..=35);

    let stats = table.verify().expect("valid tree");
    assert_eq!(stats.depth, 3);
    assert_eq!(stats.leaf_count, 5);
    assert_eq!(stats.internal_count, 3);

    let dump = table.dump_tree().expect("dump");
    assert!(dump.starts_with("- internal (size 1)\n  - internal (size "));
    assert_eq!(scan_ids(&mut table), (1..=35).collect::<Vec<_>>());
}

#[test]
fn test_split_in_middle_of_tree() {
    let dir = TestDir::new();
    let mut table = dir.open();

    // Spread keys out, then fill the gaps so splits land in inner leaves.
    insert_all(&mut table, (1..=60).map(|k| k * 10));
    insert_all(&mut table, (1..=60).map(|k| k * 10 - 5));

    table.verify().expect("valid tree");
    let expected: Vec<u32> = (1..=120).map(|k| k * 5).collect();
    assert_eq!(scan_ids(&mut table), expected);
}

#[test]
fn test_wide_fan_out_stays_shallow() {
    let dir = TestDir::new();
    let config = TableConfig {
        internal_node_max_cells: 200,
        ..TableConfig::default()
    };
    let mut table = dir.open_with(config);
    insert_all(&mut table, 1..=500);

    let stats = table.verify().expect("valid tree");
    assert_eq!(stats.depth, 2);
    assert_eq!(stats.row_count, 500);
}
