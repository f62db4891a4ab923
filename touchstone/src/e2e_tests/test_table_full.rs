//! Test the page-cap boundary.

use crate::e2e_tests::helpers::*;
use crate::storage::btree::LEAF_NODE_MAX_CELLS;
use crate::{TableConfig, TableError};

#[test]
fn test_single_page_holds_one_leaf() {
    let dir = TestDir::new();
    let config = TableConfig {
        max_pages: 1,
        ..TableConfig::default()
    };
    let mut table = dir.open_with(config);
    insert_all(&mut table, 1..=LEAF_NODE_MAX_CELLS);

    let err = table
        .insert(&row(LEAF_NODE_MAX_CELLS + 1))
        .expect_err("table full");
    assert!(matches!(err, TableError::TableFull { max_pages: 1 }));
    assert_eq!(err.to_string(), "table full (1 pages)");

    assert_eq!(
        scan_ids(&mut table),
        (1..=LEAF_NODE_MAX_CELLS).collect::<Vec<_>>()
    );
    table.close().expect("close");

    let mut table = dir.open_with(config);
    assert_eq!(scan_ids(&mut table).len(), LEAF_NODE_MAX_CELLS as usize);
}

#[test]
fn test_full_table_still_rejects_duplicates_first() {
    let dir = TestDir::new();
    let config = TableConfig {
        max_pages: 1,
        ..TableConfig::default()
    };
    let mut table = dir.open_with(config);
    insert_all(&mut table, 1..=LEAF_NODE_MAX_CELLS);

    assert!(matches!(
        table.insert(&row(1)),
        Err(TableError::DuplicateKey(1))
    ));
}

#[test]
fn test_fill_to_cap_leaves_valid_tree() {
    let dir = TestDir::new();
    let config = TableConfig {
        max_pages: 30,
        internal_node_max_cells: 3,
    };
    let mut table = dir.open_with(config);

    let mut inserted = 0;
    for id in 1.. {
        match table.insert(&row(id)) {
            Ok(()) => inserted += 1,
            Err(e) => {
                assert!(matches!(e, TableError::TableFull { max_pages: 30 }), "{e}");
                break;
            }
        }
    }

    assert!(table.num_pages() <= 30);
    assert_eq!(table.verify().expect("valid tree").row_count, inserted);
    table.close().expect("close");

    let mut table = dir.open_with(config);
    assert_eq!(scan_ids(&mut table), (1..=inserted).collect::<Vec<_>>());
}

#[test]
fn test_file_larger_than_cap_is_rejected() {
    let dir = TestDir::new();
    {
        let mut table = dir.open();
        insert_all(&mut table, 1..=30);
        table.close().expect("close");
    }

    let config = TableConfig {
        max_pages: 2,
        ..TableConfig::default()
    };
    let err = crate::Table::open_with_config(dir.path(), config).expect_err("too many pages");
    assert!(matches!(
        err,
        TableError::Pager(crate::storage::PagerError::TooManyPages { max_pages: 2, .. })
    ));
    assert!(!err.is_recoverable());
}
