//! The fixed-schema row stored in the table.
//!
//! A row is `(id, username, email)` and always serializes to exactly
//! `ROW_SIZE` bytes:
//!
//! | field    | offset | width |
//! |----------|--------|-------|
//! | id       | 0      | 4     |
//! | username | 4      | 33    |
//! | email    | 37     | 256   |
//!
//! Text columns are NUL-padded to their width. Each width has one byte more than
//! the longest value the column accepts, so a stored value is always followed by
//! at least one NUL. Values may not contain NUL themselves.

use std::fmt;

/// Longest username accepted, in bytes.
pub const COLUMN_USERNAME_SIZE: usize = 32;
/// Longest email accepted, in bytes.
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
/// Serialized size of a row in bytes.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A single table row. `id` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    id: u32,
    username: String,
    email: String,
}

impl Row {
    /// Build a row, checking both text columns fit their fixed widths and hold
    /// no NUL bytes.
    pub fn new(
        id: u32,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, RowError> {
        let username = username.into();
        let email = email.into();

        if username.len() > COLUMN_USERNAME_SIZE {
            return Err(RowError::UsernameTooLong(username.len()));
        }
        if email.len() > COLUMN_EMAIL_SIZE {
            return Err(RowError::EmailTooLong(email.len()));
        }
        if username.contains('\0') {
            return Err(RowError::InteriorNul { column: "username" });
        }
        if email.contains('\0') {
            return Err(RowError::InteriorNul { column: "email" });
        }

        Ok(Self {
            id,
            username,
            email,
        })
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Serialize into `destination`, which must be exactly `ROW_SIZE` bytes.
    pub fn serialize_into(&self, destination: &mut [u8]) -> Result<(), RowError> {
        if destination.len() != ROW_SIZE {
            return Err(RowError::WrongBufferSize(destination.len()));
        }

        self.write_fields(destination);
        Ok(())
    }

    /// Serialize into a fresh buffer.
    #[must_use]
    pub fn serialize(&self) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        self.write_fields(&mut buf);
        buf
    }

    fn write_fields(&self, destination: &mut [u8]) {
        destination[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        write_padded(
            &mut destination[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            self.username.as_bytes(),
        );
        write_padded(
            &mut destination[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            self.email.as_bytes(),
        );
    }

    /// Deserialize from a `ROW_SIZE` byte slice.
    pub fn deserialize(source: &[u8]) -> Result<Self, RowError> {
        if source.len() != ROW_SIZE {
            return Err(RowError::WrongBufferSize(source.len()));
        }

        let id = u32::from_le_bytes([
            source[ID_OFFSET],
            source[ID_OFFSET + 1],
            source[ID_OFFSET + 2],
            source[ID_OFFSET + 3],
        ]);
        let username = read_padded(
            &source[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            "username",
        )?;
        let email = read_padded(&source[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], "email")?;

        Ok(Self {
            id,
            username,
            email,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row id: {}, username: {}, email: {}",
            self.id, self.username, self.email
        )
    }
}

/// Copy `value` into `field` and NUL-fill the rest. Longer values are truncated.
fn write_padded(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
    field[len..].fill(0);
}

/// Read a NUL-terminated (or full-width) UTF-8 field.
fn read_padded(field: &[u8], column: &'static str) -> Result<String, RowError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|_| RowError::InvalidUtf8 { column })
}

/// Errors from building or decoding a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// Username longer than `COLUMN_USERNAME_SIZE` bytes.
    UsernameTooLong(usize),
    /// Email longer than `COLUMN_EMAIL_SIZE` bytes.
    EmailTooLong(usize),
    /// Text column contains a NUL byte, which the padded encoding cannot hold.
    InteriorNul { column: &'static str },
    /// Buffer handed to the codec is not `ROW_SIZE` bytes.
    WrongBufferSize(usize),
    /// Stored text column is not valid UTF-8.
    InvalidUtf8 { column: &'static str },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooLong(len) => write!(
                f,
                "username is {len} bytes (max {COLUMN_USERNAME_SIZE})"
            ),
            Self::EmailTooLong(len) => {
                write!(f, "email is {len} bytes (max {COLUMN_EMAIL_SIZE})")
            }
            Self::InteriorNul { column } => write!(f, "{column} contains a NUL byte"),
            Self::WrongBufferSize(len) => {
                write!(f, "row buffer is {len} bytes (expected {ROW_SIZE})")
            }
            Self::InvalidUtf8 { column } => write!(f, "stored {column} is not valid UTF-8"),
        }
    }
}

impl std::error::Error for RowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(USERNAME_OFFSET, 4);
        assert_eq!(EMAIL_OFFSET, 37);
        assert_eq!(ROW_SIZE, 293);
    }

    #[test]
    fn test_row_roundtrip_at_max_widths() {
        let username = "u".repeat(COLUMN_USERNAME_SIZE);
        let email = "e".repeat(COLUMN_EMAIL_SIZE);
        let row = Row::new(u32::MAX, username, email).expect("valid row");

        let bytes = row.serialize();
        let restored = Row::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, row);
    }

    #[test]
    fn test_row_roundtrip_empty_and_unicode() {
        let row = Row::new(0, "", "zoë@example.com").expect("valid row");
        let mut buf = [0xAAu8; ROW_SIZE];
        row.serialize_into(&mut buf).expect("serialize");

        // Stale bytes past the value are overwritten with NULs.
        assert!(buf[USERNAME_OFFSET..EMAIL_OFFSET].iter().all(|&b| b == 0));
        assert_eq!(Row::deserialize(&buf).expect("deserialize"), row);
    }

    #[test]
    fn test_serialized_layout() {
        let row = Row::new(0x0102_0304, "bob", "bob@x.io").expect("valid row");
        let bytes = row.serialize();

        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[USERNAME_OFFSET..USERNAME_OFFSET + 4], b"bob\0");
        assert_eq!(&bytes[EMAIL_OFFSET..EMAIL_OFFSET + 9], b"bob@x.io\0");
    }

    #[test]
    fn test_rejects_long_columns() {
        let long_username = "a".repeat(COLUMN_USERNAME_SIZE + 1);
        assert_eq!(
            Row::new(1, long_username, "a@b.c"),
            Err(RowError::UsernameTooLong(33))
        );

        let long_email = "a".repeat(COLUMN_EMAIL_SIZE + 1);
        assert_eq!(
            Row::new(1, "a", long_email),
            Err(RowError::EmailTooLong(256))
        );
    }

    #[test]
    fn test_rejects_nul_in_text_columns() {
        assert_eq!(
            Row::new(1, "ab\0cd", "x@y.z"),
            Err(RowError::InteriorNul { column: "username" })
        );
        assert_eq!(
            Row::new(1, "ab", "x\0@y.z"),
            Err(RowError::InteriorNul { column: "email" })
        );
        assert_eq!(
            RowError::InteriorNul { column: "email" }.to_string(),
            "email contains a NUL byte"
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_input() {
        assert_eq!(
            Row::deserialize(&[0u8; 10]),
            Err(RowError::WrongBufferSize(10))
        );

        let mut bytes = [0u8; ROW_SIZE];
        bytes[USERNAME_OFFSET] = 0xFF;
        assert_eq!(
            Row::deserialize(&bytes),
            Err(RowError::InvalidUtf8 { column: "username" })
        );
    }

    #[test]
    fn test_display() {
        let row = Row::new(7, "ada", "ada@example.com").expect("valid row");
        assert_eq!(
            row.to_string(),
            "Row id: 7, username: ada, email: ada@example.com"
        );
    }
}
