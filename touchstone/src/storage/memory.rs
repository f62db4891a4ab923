//! In-memory storage for tests and throwaway tables.
//!
//! `MemoryStorage` keeps the whole "file" in a byte vector and can be told to
//! fail reads, writes or syncs so error propagation through the pager and tree
//! can be exercised without a real disk.

use std::cell::RefCell;
use std::rc::Rc;

use crate::storage::io::{Storage, StorageError};
use crate::storage::page::{PAGE_SIZE, Page, PageNum};

/// Which operations should fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultConfig {
    /// Fail every `read_page`.
    pub fail_reads: bool,
    /// Fail every `write_page`.
    pub fail_writes: bool,
    /// Fail every `sync`.
    pub fail_syncs: bool,
}

impl FaultConfig {
    /// No faults.
    #[must_use]
    pub const fn no_faults() -> Self {
        Self {
            fail_reads: false,
            fail_writes: false,
            fail_syncs: false,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    bytes: Vec<u8>,
    faults: FaultConfig,
    syncs: u64,
}

/// A `Storage` backed by a shared byte vector.
///
/// Clones share the same bytes, so a test can keep one handle, give another to
/// a table, close the table and then reopen it from the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-filled with `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                bytes,
                ..Inner::default()
            })),
        }
    }

    /// Snapshot of the current contents.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.borrow().bytes.clone()
    }

    /// Replace the fault configuration.
    pub fn set_faults(&self, faults: FaultConfig) {
        self.inner.borrow_mut().faults = faults;
    }

    /// Number of successful `sync` calls.
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.inner.borrow().syncs
    }
}

impl Storage for MemoryStorage {
    fn len_bytes(&self) -> Result<u64, StorageError> {
        Ok(self.inner.borrow().bytes.len() as u64)
    }

    fn read_page(&mut self, page_num: PageNum, page: &mut Page) -> Result<(), StorageError> {
        let inner = self.inner.borrow();
        if inner.faults.fail_reads {
            return Err(StorageError::InjectedFault(format!("read of page {page_num}")));
        }

        let start = page_num as usize * PAGE_SIZE;
        let Some(bytes) = inner.bytes.get(start..start + PAGE_SIZE) else {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("page {page_num} is past the end of storage"),
            )));
        };
        page.as_bytes_mut().copy_from_slice(bytes);
        Ok(())
    }

    fn write_page(&mut self, page_num: PageNum, page: &Page) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.faults.fail_writes {
            return Err(StorageError::InjectedFault(format!("write of page {page_num}")));
        }

        let start = page_num as usize * PAGE_SIZE;
        if inner.bytes.len() < start + PAGE_SIZE {
            inner.bytes.resize(start + PAGE_SIZE, 0);
        }
        inner.bytes[start..start + PAGE_SIZE].copy_from_slice(page.as_bytes());
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.faults.fail_syncs {
            return Err(StorageError::InjectedFault("sync".to_string()));
        }
        inner.syncs += 1;
        Ok(())
    }
}
