//! Test column width limits end to end.

use crate::e2e_tests::helpers::*;
use crate::types::{COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};
use crate::{Row, RowError, TableError};

#[test]
fn test_max_width_row_persists() {
    let dir = TestDir::new();
    let username = "u".repeat(COLUMN_USERNAME_SIZE);
    let email = "e".repeat(COLUMN_EMAIL_SIZE);
    let wide = Row::new(u32::MAX, username.as_str(), email.as_str()).expect("valid row");
    {
        let mut table = dir.open();
        table.insert(&wide).expect("insert");
        table.insert(&row(0)).expect("insert");
        table.close().expect("close");
    }

    let mut table = dir.open();
    let got = table.get(u32::MAX).expect("get").expect("row present");
    assert_eq!(got.username(), username);
    assert_eq!(got.email(), email);
    assert_eq!(scan_ids(&mut table), vec![0, u32::MAX]);
}

#[test]
fn test_oversized_values_rejected() {
    let username = "u".repeat(COLUMN_USERNAME_SIZE + 1);
    let err = TableError::from(Row::new(1, username, "a@b.c").expect_err("too long"));
    assert!(matches!(err, TableError::Row(RowError::UsernameTooLong(33))));
    assert!(err.is_recoverable());

    let email = "e".repeat(COLUMN_EMAIL_SIZE + 1);
    assert_eq!(
        Row::new(1, "name", email),
        Err(RowError::EmailTooLong(COLUMN_EMAIL_SIZE + 1))
    );
}

#[test]
fn test_empty_text_columns() {
    let dir = TestDir::new();
    let mut table = dir.open();
    let blank = Row::new(5, "", "").expect("valid row");
    table.insert(&blank).expect("insert");

    assert_eq!(table.get(5).expect("get"), Some(blank));
}

#[test]
fn test_nul_in_value_rejected_before_storage() {
    let dir = TestDir::new();
    let mut table = dir.open();

    let err = TableError::from(Row::new(1, "ab\0cd", "x@y.z").expect_err("interior NUL"));
    assert!(matches!(
        err,
        TableError::Row(RowError::InteriorNul { column: "username" })
    ));
    assert!(err.is_recoverable());

    table.insert(&row(1)).expect("insert");
    assert_eq!(table.get(1).expect("get"), Some(row(1)));
}
