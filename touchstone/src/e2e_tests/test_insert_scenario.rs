//! Test the basic insert / duplicate / scan cycle.

use crate::TableError;
use crate::e2e_tests::helpers::*;

#[test]
fn test_insert_with_one_duplicate() {
    let dir = TestDir::new();
    let mut table = dir.open();

    let mut inserted = 0;
    let mut duplicates = Vec::new();
    for id in [3, 1, 4, 1, 5] {
        match table.insert(&row(id)) {
            Ok(()) => inserted += 1,
            Err(TableError::DuplicateKey(key)) => duplicates.push(key),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(inserted, 4);
    assert_eq!(duplicates, vec![1]);
    assert_eq!(scan_ids(&mut table), vec![1, 3, 4, 5]);
}

#[test]
fn test_duplicate_does_not_replace_row() {
    let dir = TestDir::new();
    let mut table = dir.open();
    table.insert(&row(7)).expect("insert");

    let impostor = crate::Row::new(7, "impostor", "impostor@example.com").expect("valid row");
    let err = table.insert(&impostor).expect_err("duplicate");
    assert!(err.is_recoverable());

    assert_eq!(table.get(7).expect("get"), Some(row(7)));
}

#[test]
fn test_scan_empty_table() {
    let dir = TestDir::new();
    let mut table = dir.open();

    assert!(scan_ids(&mut table).is_empty());
    assert_eq!(table.get(0).expect("get"), None);
}

#[test]
fn test_rows_display() {
    let dir = TestDir::new();
    let mut table = dir.open();
    insert_all(&mut table, [2, 1]);

    let lines: Vec<String> = table
        .select_all()
        .expect("select_all")
        .map(|row| row.expect("row").to_string())
        .collect();
    assert_eq!(
        lines,
        vec![
            "Row id: 1, username: user1, email: person1@example.com",
            "Row id: 2, username: user2, email: person2@example.com",
        ]
    );
}
