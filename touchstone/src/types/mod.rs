//! Value types stored in a table.

mod row;

pub use row::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE,
    ROW_SIZE, Row, RowError, USERNAME_OFFSET, USERNAME_SIZE,
};
