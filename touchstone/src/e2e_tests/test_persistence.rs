//! Test that rows survive closing and reopening the table file.

use crate::e2e_tests::helpers::*;

#[test]
fn test_reopen_returns_same_rows() {
    let dir = TestDir::new();
    {
        let mut table = dir.open();
        insert_all(&mut table, [10, 2, 33, 4, 25]);
        table.close().expect("close");
    }

    let mut table = dir.open();
    assert_eq!(scan_ids(&mut table), vec![2, 4, 10, 25, 33]);
    assert_eq!(table.get(33).expect("get"), Some(row(33)));
}

#[test]
fn test_reopen_multi_level_tree_and_keep_inserting() {
    let dir = TestDir::new();
    {
        let mut table = dir.open();
        insert_all(&mut table, 1..=150);
        table.close().expect("close");
    }

    let file_len = std::fs::metadata(dir.path()).expect("metadata").len();
    assert_eq!(file_len % crate::storage::PAGE_SIZE_U64, 0);

    {
        let mut table = dir.open();
        let stats = table.verify().expect("valid tree");
        assert_eq!(stats.row_count, 150);
        assert!(stats.depth >= 3);
        assert_eq!(u64::from(table.num_pages()) * crate::storage::PAGE_SIZE_U64, file_len);

        insert_all(&mut table, 151..=250);
        table.close().expect("close");
    }

    let mut table = dir.open();
    assert_eq!(scan_ids(&mut table), (1..=250).collect::<Vec<_>>());
    assert_eq!(table.verify().expect("valid tree").row_count, 250);
}

#[test]
fn test_drop_flushes_like_close() {
    let dir = TestDir::new();
    {
        let mut table = dir.open();
        insert_all(&mut table, 1..=20);
    }

    let mut table = dir.open();
    assert_eq!(scan_ids(&mut table), (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_reopen_is_idempotent() {
    let dir = TestDir::new();
    dir.open().close().expect("close empty table");
    dir.open().close().expect("close again");

    assert_eq!(
        std::fs::metadata(dir.path()).expect("metadata").len(),
        crate::storage::PAGE_SIZE_U64
    );
    let mut table = dir.open();
    assert!(scan_ids(&mut table).is_empty());
}
