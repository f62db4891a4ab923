//! Single-file table storage.
//!
//! # File Format
//!
//! The table file is a sequence of 4096-byte pages and nothing else: no
//! superblock and no free list. Every page holds one B+tree node, and page 0 is
//! always the root. All integers are little-endian.
//!
//! # Usage
//!
//! ```no_run
//! use touchstone::storage::Table;
//! use touchstone::types::Row;
//!
//! let mut table = Table::open("users.db")?;
//! table.insert(&Row::new(1, "ada", "ada@example.com")?)?;
//!
//! for row in table.select_all()? {
//!     println!("{}", row?);
//! }
//! table.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod btree;
mod file;
mod io;
mod memory;
mod page;
mod pager;
mod table;

pub use file::FileStorage;
pub use io::{Storage, StorageError};
pub use memory::{FaultConfig, MemoryStorage};
pub use page::{PAGE_SIZE, PAGE_SIZE_U64, Page, PageNum};
pub use pager::{Pager, PagerError};
pub use table::{Rows, Table, TableError};
