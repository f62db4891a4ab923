//! A single-table row store backed by a paged B+tree.
//!
//! Rows of a fixed schema `(id, username, email)` live in one file, keyed by
//! `id`. Callers open a [`Table`], insert rows, scan them back in id order, and
//! close the table to flush the page cache.
//!
//! Layers, bottom up:
//! - [`storage::Storage`]: the medium (a file, or memory in tests)
//! - [`storage::Pager`]: fixed-capacity page cache over the medium
//! - [`storage::btree`]: node layout, cursor, and the insert/split algorithms
//! - [`Table`]: the handle a caller holds

pub mod config;
mod e2e_tests;
pub mod storage;
pub mod types;

pub use config::{ConfigError, TableConfig};
pub use storage::{Rows, Table, TableError};
pub use types::{Row, RowError};
