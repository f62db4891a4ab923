//! Fixed-capacity page cache.
//!
//! The pager owns the backing storage and one optional buffer per page number
//! up to `max_pages`. Pages are loaded on first touch and kept until `close`,
//! which writes every cached page back. There is no dirty tracking: every page
//! the tree touched is assumed modified.
//!
//! # Invariants
//!
//! - `pages.len() == max_pages`
//! - `num_pages <= max_pages`
//! - every cached page has a number `< num_pages`
//! - the on-disk length was a whole number of pages when the pager was opened

use crate::storage::io::{Storage, StorageError};
use crate::storage::page::{PAGE_SIZE_U64, Page, PageNum};

/// Page cache sitting between the B+tree and the storage medium.
pub struct Pager {
    storage: Box<dyn Storage>,
    /// Length of the medium when it was opened.
    file_length: u64,
    /// Pages that existed on disk when the pager was opened.
    pages_on_disk: u32,
    /// Pages known to the pager, on disk or only in cache.
    num_pages: u32,
    max_pages: u32,
    pages: Vec<Option<Page>>,
    closed: bool,
}

impl Pager {
    /// Attach a pager to `storage`.
    ///
    /// # Errors
    ///
    /// - `CorruptFile` if the length is not a multiple of the page size
    /// - `TooManyPages` if the medium holds more pages than `max_pages`
    pub fn open(storage: Box<dyn Storage>, max_pages: u32) -> Result<Self, PagerError> {
        let file_length = storage.len_bytes()?;

        if file_length % PAGE_SIZE_U64 != 0 {
            return Err(PagerError::CorruptFile { file_length });
        }

        let pages_on_disk = u32::try_from(file_length / PAGE_SIZE_U64)
            .ok()
            .filter(|&pages| pages <= max_pages)
            .ok_or(PagerError::TooManyPages {
                file_length,
                max_pages,
            })?;

        let mut pages = Vec::with_capacity(max_pages as usize);
        pages.resize_with(max_pages as usize, || None);

        Ok(Self {
            storage,
            file_length,
            pages_on_disk,
            num_pages: pages_on_disk,
            max_pages,
            pages,
            closed: false,
        })
    }

    /// Length of the medium when the pager was opened.
    #[must_use]
    pub const fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Number of pages the table currently spans.
    #[must_use]
    pub const fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Configured page-count ceiling.
    #[must_use]
    pub const fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Whether page `page_num` is currently held in the cache.
    #[must_use]
    pub fn is_cached(&self, page_num: PageNum) -> bool {
        self.pages
            .get(page_num as usize)
            .is_some_and(Option::is_some)
    }

    /// Get the buffer for page `page_num`, loading it on a cache miss.
    ///
    /// Pages past the end of the file come back zeroed and count towards
    /// `num_pages` from this point on.
    pub fn get_page(&mut self, page_num: PageNum) -> Result<&mut Page, PagerError> {
        if page_num >= self.max_pages {
            return Err(PagerError::PageOutOfBounds {
                page_num,
                max_pages: self.max_pages,
            });
        }

        self.closed = false;
        let slot = page_num as usize;
        if self.pages[slot].is_none() {
            let mut page = Page::new();
            if page_num < self.pages_on_disk {
                self.storage.read_page(page_num, &mut page)?;
            }
            self.pages[slot] = Some(page);

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        self.pages[slot]
            .as_mut()
            .ok_or(PagerError::PageNotCached(page_num))
    }

    /// Hand out the next unused page number, materialized as a zeroed page.
    ///
    /// Pages are never recycled.
    pub fn allocate_page(&mut self) -> Result<PageNum, PagerError> {
        let page_num = self.num_pages;
        if page_num >= self.max_pages {
            return Err(PagerError::StorageExhausted {
                max_pages: self.max_pages,
            });
        }

        self.get_page(page_num)?;
        Ok(page_num)
    }

    /// Write a cached page back to storage.
    pub fn flush_page(&mut self, page_num: PageNum) -> Result<(), PagerError> {
        let page = self
            .pages
            .get(page_num as usize)
            .and_then(Option::as_ref)
            .ok_or(PagerError::PageNotCached(page_num))?;

        self.storage.write_page(page_num, page)?;
        Ok(())
    }

    /// Flush every cached page, sync, and drop the cache.
    pub fn close(&mut self) -> Result<(), PagerError> {
        for page_num in 0..self.num_pages {
            if self.is_cached(page_num) {
                self.flush_page(page_num)?;
            }
        }
        self.storage.sync()?;

        for slot in &mut self.pages {
            *slot = None;
        }
        self.pages_on_disk = self.num_pages;
        self.file_length = u64::from(self.num_pages) * PAGE_SIZE_U64;
        self.closed = true;
        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                tracing::warn!("failed to flush pages while dropping pager: {e}");
            }
        }
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("file_length", &self.file_length)
            .field("num_pages", &self.num_pages)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur inside the pager.
#[derive(Debug)]
pub enum PagerError {
    /// Storage medium error.
    Storage(StorageError),
    /// File length is not a whole number of pages.
    CorruptFile { file_length: u64 },
    /// File holds more pages than the configured ceiling.
    TooManyPages { file_length: u64, max_pages: u32 },
    /// Page number at or past the configured ceiling.
    PageOutOfBounds { page_num: PageNum, max_pages: u32 },
    /// Tried to flush a page that was never loaded.
    PageNotCached(PageNum),
    /// No page numbers left to allocate.
    StorageExhausted { max_pages: u32 },
}

impl std::fmt::Display for PagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::CorruptFile { file_length } => write!(
                f,
                "corrupt db file: length {file_length} is not a whole number of pages"
            ),
            Self::TooManyPages {
                file_length,
                max_pages,
            } => write!(
                f,
                "db file of {file_length} bytes exceeds the limit of {max_pages} pages"
            ),
            Self::PageOutOfBounds {
                page_num,
                max_pages,
            } => write!(f, "page {page_num} out of bounds (max pages: {max_pages})"),
            Self::PageNotCached(page_num) => write!(f, "tried to flush uncached page {page_num}"),
            Self::StorageExhausted { max_pages } => {
                write!(f, "all {max_pages} pages are in use")
            }
        }
    }
}

impl std::error::Error for PagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for PagerError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
