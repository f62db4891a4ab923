//! Common helpers for end-to-end tests.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use crate::{Row, Table, TableConfig};

static TRACING: Once = Once::new();

/// Install a log subscriber once per test binary. Set `RUST_LOG=debug` to see
/// split and root-creation events.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A temporary directory holding one table file. The directory is removed on
/// drop.
pub struct TestDir {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDir {
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("table.db");
        Self { _dir: dir, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the table file with the default configuration.
    #[must_use]
    pub fn open(&self) -> Table {
        self.open_with(TableConfig::default())
    }

    #[must_use]
    pub fn open_with(&self, config: TableConfig) -> Table {
        Table::open_with_config(&self.path, config).expect("Failed to open table")
    }
}

/// A row whose text columns are derived from `id`.
#[must_use]
pub fn row(id: u32) -> Row {
    Row::new(id, format!("user{id}"), format!("person{id}@example.com")).expect("valid row")
}

/// Ids of every row in scan order.
#[must_use]
pub fn scan_ids(table: &mut Table) -> Vec<u32> {
    table
        .select_all()
        .expect("select_all")
        .map(|row| row.expect("row").id())
        .collect()
}

pub fn insert_all(table: &mut Table, ids: impl IntoIterator<Item = u32>) {
    for id in ids {
        table.insert(&row(id)).expect("insert");
    }
}
