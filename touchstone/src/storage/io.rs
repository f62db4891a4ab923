//! Storage abstraction over the medium that backs a table.
//!
//! The pager never touches a `File` directly. It reads and writes whole pages
//! through the `Storage` trait, which lets tables live on disk in production
//! and in memory (with optional fault injection) in tests.

use crate::storage::page::{Page, PageNum};

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error.
    Io(std::io::Error),
    /// Injected fault for simulation.
    InjectedFault(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InjectedFault(msg) => write!(f, "injected fault: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InjectedFault(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Abstraction over page-based storage operations.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `read_page` returns the last written content for a page
/// - `write_page` of page `n` extends the medium to at least `(n + 1) * PAGE_SIZE` bytes
/// - `sync` makes all previous writes durable
pub trait Storage {
    /// Current length of the medium in bytes.
    fn len_bytes(&self) -> Result<u64, StorageError>;

    /// Read page `page_num` into `page`.
    ///
    /// Only called for pages that lie entirely within `len_bytes()`.
    fn read_page(&mut self, page_num: PageNum, page: &mut Page) -> Result<(), StorageError>;

    /// Write the full contents of `page` at page offset `page_num`.
    fn write_page(&mut self, page_num: PageNum, page: &Page) -> Result<(), StorageError>;

    /// Sync all pending writes.
    fn sync(&mut self) -> Result<(), StorageError>;
}
