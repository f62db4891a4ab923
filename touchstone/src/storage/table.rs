//! The table handle.
//!
//! A `Table` owns the pager for one table file and exposes the row-level
//! operations: insert, full ordered scan, point lookup, and the debugging
//! helpers. The B+tree itself is borrowed from the pager per operation, so no
//! tree state outlives a call.

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, TableConfig};
use crate::storage::btree::{
    BTree, BTreeError, Cursor, InvariantViolation, NodeError, ROOT_PAGE_NUM, TreeStats, verify,
};
use crate::storage::file::FileStorage;
use crate::storage::io::{Storage, StorageError};
use crate::storage::pager::{Pager, PagerError};
use crate::types::{Row, RowError};

/// An open table.
///
/// Changes live in the page cache until `close`, which writes every touched
/// page back. Dropping a table without closing it attempts the same flush.
pub struct Table {
    pager: Pager,
    config: TableConfig,
    path: Option<PathBuf>,
}

impl Table {
    /// Open the table file at `path`, creating it if it does not exist. Limits
    /// come from the environment (see `TableConfig::from_env`), with defaults
    /// for unset variables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::open_with_config(path, TableConfig::from_env()?)
    }

    /// Open the table file at `path`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// - `Config` if `config` fails validation (checked before the file is touched)
    /// - `Pager` if the file cannot be opened, is not a whole number of pages,
    ///   or holds more pages than `config.max_pages`
    pub fn open_with_config(path: impl AsRef<Path>, config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let path = path.as_ref();
        let storage = FileStorage::open(path)?;

        let mut table = Self::with_storage(Box::new(storage), config)?;
        table.path = Some(path.to_path_buf());
        tracing::info!(
            "opened table at {} ({} pages)",
            path.display(),
            table.pager.num_pages()
        );
        Ok(table)
    }

    /// Open a table over any storage medium.
    pub fn with_storage(storage: Box<dyn Storage>, config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let mut pager = Pager::open(storage, config.max_pages)?;
        if BTree::new(&mut pager, config.internal_node_max_cells).initialize_root()? {
            tracing::debug!("initialized empty root leaf");
        }

        Ok(Self {
            pager,
            config,
            path: None,
        })
    }

    fn tree(&mut self) -> BTree<'_> {
        BTree::new(&mut self.pager, self.config.internal_node_max_cells)
    }

    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Path of the backing file, if the table lives on disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Pages the table currently spans.
    #[must_use]
    pub const fn num_pages(&self) -> u32 {
        self.pager.num_pages()
    }

    /// Insert `row`, keyed by its id.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if a row with the same id exists
    /// - `TableFull` if the page cap leaves no room for the split this insert
    ///   needs
    ///
    /// On either error the table is unchanged.
    pub fn insert(&mut self, row: &Row) -> Result<(), TableError> {
        self.tree().insert(row.id(), row)?;
        Ok(())
    }

    /// Iterate over every row in ascending id order.
    ///
    /// Each call starts a fresh scan from the first row.
    pub fn select_all(&mut self) -> Result<Rows<'_>, TableError> {
        let cursor = self.tree().start()?;
        Ok(Rows {
            pager: &mut self.pager,
            cursor,
        })
    }

    /// Position a cursor at `key`, or where `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor, TableError> {
        Ok(self.tree().find(key)?)
    }

    /// Fetch the row with id `key`.
    pub fn get(&mut self, key: u32) -> Result<Option<Row>, TableError> {
        Ok(self.tree().get(key)?)
    }

    /// Render the tree structure for debugging.
    pub fn dump_tree(&mut self) -> Result<String, TableError> {
        Ok(self.tree().dump_tree()?)
    }

    /// Check every structural invariant of the tree.
    pub fn verify(&mut self) -> Result<TreeStats, TableError> {
        Ok(verify(
            &mut self.pager,
            ROOT_PAGE_NUM,
            self.config.internal_node_max_cells,
        )?)
    }

    /// Write every touched page back and release the storage.
    pub fn close(mut self) -> Result<(), TableError> {
        self.pager.close()?;
        match &self.path {
            Some(path) => tracing::info!(
                "closed table at {} ({} pages)",
                path.display(),
                self.pager.num_pages()
            ),
            None => tracing::info!("closed table ({} pages)", self.pager.num_pages()),
        }
        Ok(())
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("pager", &self.pager)
            .finish()
    }
}

/// Ordered scan over a table, returned by `Table::select_all`.
///
/// Stops after the first error.
pub struct Rows<'a> {
    pager: &'a mut Pager,
    cursor: Cursor,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_end_of_table() {
            return None;
        }

        let result = self
            .cursor
            .row(self.pager)
            .and_then(|row| self.cursor.advance(self.pager).map(|()| row));
        if result.is_err() {
            self.cursor.end_of_table = true;
        }
        Some(result.map_err(TableError::from))
    }
}

impl std::iter::FusedIterator for Rows<'_> {}

/// Errors returned by table operations.
#[derive(Debug)]
pub enum TableError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// Pager or storage failure.
    Pager(PagerError),
    /// Malformed node contents.
    Node(NodeError),
    /// Row failed validation or could not be decoded.
    Row(RowError),
    /// A row with this id already exists.
    DuplicateKey(u32),
    /// The page cap leaves no room for this insert.
    TableFull { max_pages: u32 },
    /// The tree's structure is broken.
    Corrupt(InvariantViolation),
}

impl TableError {
    /// Whether the caller can carry on using the table after this error.
    ///
    /// Duplicate keys, a full table and oversized row values leave the table
    /// untouched. Everything else points at broken storage or a corrupt file.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey(_)
                | Self::TableFull { .. }
                | Self::Row(
                    RowError::UsernameTooLong(_)
                        | RowError::EmailTooLong(_)
                        | RowError::InteriorNul { .. }
                )
        )
    }
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::Pager(e) => write!(f, "pager error: {e}"),
            Self::Node(e) => write!(f, "node error: {e}"),
            Self::Row(e) => write!(f, "row error: {e}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key {key}"),
            Self::TableFull { max_pages } => write!(f, "table full ({max_pages} pages)"),
            Self::Corrupt(e) => write!(f, "corrupt tree: {e}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Pager(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::Row(e) => Some(e),
            Self::Corrupt(e) => Some(e),
            Self::DuplicateKey(_) | Self::TableFull { .. } => None,
        }
    }
}

impl From<ConfigError> for TableError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for TableError {
    fn from(e: StorageError) -> Self {
        Self::Pager(PagerError::Storage(e))
    }
}

impl From<PagerError> for TableError {
    fn from(e: PagerError) -> Self {
        Self::Pager(e)
    }
}

impl From<RowError> for TableError {
    fn from(e: RowError) -> Self {
        Self::Row(e)
    }
}

impl From<InvariantViolation> for TableError {
    fn from(e: InvariantViolation) -> Self {
        Self::Corrupt(e)
    }
}

impl From<BTreeError> for TableError {
    fn from(e: BTreeError) -> Self {
        match e {
            BTreeError::Pager(e) => Self::Pager(e),
            BTreeError::Node(e) => Self::Node(e),
            BTreeError::Row(e) => Self::Row(e),
            BTreeError::DuplicateKey(key) => Self::DuplicateKey(key),
            BTreeError::TableFull { max_pages } => Self::TableFull { max_pages },
            BTreeError::TreeTooDeep { page_num } => Self::Corrupt(InvariantViolation {
                page_num,
                message: "descent did not reach a leaf".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::btree::LEAF_NODE_MAX_CELLS;
    use crate::storage::memory::{FaultConfig, MemoryStorage};
    use crate::types::EMAIL_OFFSET;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{id}"), format!("person{id}@example.com")).expect("valid row")
    }

    fn memory_table(storage: &MemoryStorage, config: TableConfig) -> Table {
        Table::with_storage(Box::new(storage.clone()), config).expect("open table")
    }

    fn ids(table: &mut Table) -> Vec<u32> {
        table
            .select_all()
            .expect("select")
            .map(|row| row.expect("row").id())
            .collect()
    }

    #[test]
    fn test_new_table_is_empty() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());

        assert_eq!(table.num_pages(), 1);
        assert!(table.path().is_none());
        assert_eq!(table.select_all().expect("select").count(), 0);
        assert_eq!(table.dump_tree().expect("dump"), "- leaf (size 0)\n");
    }

    #[test]
    fn test_insert_and_select() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());
        for id in [3, 1, 2] {
            table.insert(&row(id)).expect("insert");
        }

        let rows: Vec<Row> = table
            .select_all()
            .expect("select")
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(rows, vec![row(1), row(2), row(3)]);
    }

    #[test]
    fn test_select_all_restarts() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());
        for id in 1..=20 {
            table.insert(&row(id)).expect("insert");
        }

        let first_two: Vec<u32> = table
            .select_all()
            .expect("select")
            .take(2)
            .map(|row| row.expect("row").id())
            .collect();
        assert_eq!(first_two, vec![1, 2]);
        assert_eq!(ids(&mut table), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_key_is_recoverable() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());
        table.insert(&row(1)).expect("insert");

        let err = table.insert(&row(1)).expect_err("duplicate");
        assert!(matches!(err, TableError::DuplicateKey(1)));
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "duplicate key 1");

        table.insert(&row(2)).expect("insert after duplicate");
        assert_eq!(ids(&mut table), vec![1, 2]);
    }

    #[test]
    fn test_table_full_keeps_existing_rows() {
        let storage = MemoryStorage::new();
        let config = TableConfig {
            max_pages: 1,
            ..TableConfig::default()
        };
        let mut table = memory_table(&storage, config);
        for id in 1..=LEAF_NODE_MAX_CELLS {
            table.insert(&row(id)).expect("insert");
        }

        let err = table
            .insert(&row(LEAF_NODE_MAX_CELLS + 1))
            .expect_err("table full");
        assert!(matches!(err, TableError::TableFull { max_pages: 1 }));
        assert!(err.is_recoverable());
        assert_eq!(
            ids(&mut table),
            (1..=LEAF_NODE_MAX_CELLS).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_get_and_find() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());
        for id in (2..=40).step_by(2) {
            table.insert(&row(id)).expect("insert");
        }

        assert_eq!(table.get(10).expect("get"), Some(row(10)));
        assert_eq!(table.get(11).expect("get"), None);

        let cursor = table.find(11).expect("find");
        assert!(!cursor.is_end_of_table());
        let at_slot = table.find(12).expect("find");
        assert_eq!(cursor, at_slot);
    }

    #[test]
    fn test_reopen_from_same_storage() {
        let storage = MemoryStorage::new();
        {
            let mut table = memory_table(&storage, TableConfig::default());
            for id in (1..=50).rev() {
                table.insert(&row(id)).expect("insert");
            }
            table.close().expect("close");
        }

        let mut table = memory_table(&storage, TableConfig::default());
        assert_eq!(ids(&mut table), (1..=50).collect::<Vec<_>>());
        assert_eq!(table.verify().expect("valid").row_count, 50);
    }

    #[test]
    fn test_drop_without_close_flushes() {
        let storage = MemoryStorage::new();
        {
            let mut table = memory_table(&storage, TableConfig::default());
            table.insert(&row(9)).expect("insert");
        }

        let mut table = memory_table(&storage, TableConfig::default());
        assert_eq!(table.get(9).expect("get"), Some(row(9)));
    }

    #[test]
    fn test_invalid_config_rejected_before_storage_is_read() {
        let storage = MemoryStorage::from_bytes(vec![0u8; 10]);
        let config = TableConfig {
            internal_node_max_cells: 1,
            ..TableConfig::default()
        };

        let err = Table::with_storage(Box::new(storage), config).expect_err("bad config");
        assert!(matches!(err, TableError::Config(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_corrupt_file_length() {
        let storage = MemoryStorage::from_bytes(vec![0u8; 100]);
        let err = Table::with_storage(Box::new(storage), TableConfig::default())
            .expect_err("corrupt");
        assert!(matches!(
            err,
            TableError::Pager(PagerError::CorruptFile { file_length: 100 })
        ));
    }

    #[test]
    fn test_scan_stops_at_undecodable_row() {
        let storage = MemoryStorage::new();
        {
            let mut table = memory_table(&storage, TableConfig::default());
            table.insert(&row(1)).expect("insert");
            table.insert(&row(2)).expect("insert");
            table.close().expect("close");
        }

        // Corrupt the email of the second cell: leaf header 14, cell 297, key 4.
        let mut bytes = storage.to_bytes();
        let second_row = 14 + 297 + 4;
        bytes[second_row + EMAIL_OFFSET] = 0xFF;

        let mut table = memory_table(&MemoryStorage::from_bytes(bytes), TableConfig::default());
        let mut rows = table.select_all().expect("select");
        assert_eq!(rows.next().map(|r| r.expect("row").id()), Some(1));
        let err = rows.next().expect("second item").expect_err("bad row");
        assert!(matches!(err, TableError::Row(RowError::InvalidUtf8 { column: "email" })));
        assert!(!err.is_recoverable());
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_close_reports_write_failure() {
        let storage = MemoryStorage::new();
        let mut table = memory_table(&storage, TableConfig::default());
        table.insert(&row(1)).expect("insert");

        storage.set_faults(FaultConfig {
            fail_writes: true,
            ..FaultConfig::no_faults()
        });
        let err = table.close().expect_err("write failure");
        assert!(matches!(err, TableError::Pager(PagerError::Storage(_))));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("users.db");

        let mut table = Table::open(&path).expect("open table");
        assert_eq!(table.path(), Some(path.as_path()));
        table.insert(&row(1)).expect("insert");
        table.close().expect("close");

        assert_eq!(
            std::fs::metadata(&path).expect("metadata").len(),
            crate::storage::page::PAGE_SIZE_U64
        );
    }
}
