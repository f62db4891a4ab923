//! Database file I/O operations.
//!
//! This module handles reading and writing pages to the table file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::storage::io::{Storage, StorageError};
use crate::storage::page::{PAGE_SIZE_U64, Page, PageNum};

/// A table file handle with low-level page I/O operations.
#[derive(Debug)]
pub struct FileStorage {
    file: File,
    path: PathBuf,
}

impl FileStorage {
    /// Open the file at `path`, creating it if it does not exist.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn len_bytes(&self) -> Result<u64, StorageError> {
        Ok(self.file.metadata()?.len())
    }

    fn read_page(&mut self, page_num: PageNum, page: &mut Page) -> Result<(), StorageError> {
        let offset = u64::from(page_num) * PAGE_SIZE_U64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(page.as_bytes_mut())?;
        Ok(())
    }

    fn write_page(&mut self, page_num: PageNum, page: &Page) -> Result<(), StorageError> {
        let offset = u64::from(page_num) * PAGE_SIZE_U64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_bytes())?;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.db");

        let storage = FileStorage::open(&path).expect("open storage");
        assert!(path.exists());
        assert_eq!(storage.len_bytes().expect("len"), 0);
        assert_eq!(storage.path(), path.as_path());
    }

    #[test]
    fn test_write_extends_file_and_reads_back() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.db");
        let mut storage = FileStorage::open(&path).expect("open storage");

        let mut page = Page::new();
        page.write_bytes(0, b"hello world");
        storage.write_page(2, &page).expect("write page");
        storage.sync().expect("sync");

        assert_eq!(storage.len_bytes().expect("len"), 3 * PAGE_SIZE_U64);

        let mut read_back = Page::new();
        storage.read_page(2, &mut read_back).expect("read page");
        assert_eq!(read_back.read_bytes(0, 11), b"hello world");

        // The gap before the written page reads as zeros.
        let mut gap = Page::new();
        storage.read_page(0, &mut gap).expect("read gap");
        assert_eq!(gap, Page::new());
    }

    #[test]
    fn test_reopen_preserves_contents() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.db");

        {
            let mut storage = FileStorage::open(&path).expect("open storage");
            let mut page = Page::new();
            page.write_u32(100, 0xDEAD_BEEF);
            storage.write_page(0, &page).expect("write");
            storage.sync().expect("sync");
        }

        let mut storage = FileStorage::open(&path).expect("reopen storage");
        let mut page = Page::new();
        storage.read_page(0, &mut page).expect("read");
        assert_eq!(page.read_u32(100), 0xDEAD_BEEF);
        assert_eq!(fs::metadata(&path).expect("metadata").len(), PAGE_SIZE_U64);
    }

    #[test]
    fn test_read_past_end_is_an_error() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.db");
        let mut storage = FileStorage::open(&path).expect("open storage");

        let mut page = Page::new();
        let result = storage.read_page(0, &mut page);
        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
