//! Journal receiver records
//!
//! A receiver is one segment of a journal's append-only log. Receivers are
//! identified by a fixed-width object name and ordered by the time they
//! were attached to the journal.

use std::fmt;

/// Width of every object name on the journaling subsystem
pub const NAME_LEN: usize = 10;

/// Width of the canonical `CYYMMDDHHmmSS` timestamp
pub const TIMESTAMP_LEN: usize = 13;

/// Error produced when a name or timestamp field fails validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("object name is empty")]
    EmptyName,
    #[error("object name '{0}' is longer than 10 characters")]
    NameTooLong(String),
    #[error("object name '{0}' contains invalid characters")]
    InvalidName(String),
    #[error("timestamp '{0}' is not 13 digits (CYYMMDDHHmmSS)")]
    InvalidTimestamp(String),
}

/// Fixed-width, blank-padded, upper-case object name
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectName([u8; NAME_LEN]);

impl ObjectName {
    /// Parse a name, upper-casing it and padding it with blanks
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim_end_matches(' ');
        if trimmed.is_empty() {
            return Err(FieldError::EmptyName);
        }
        if trimmed.len() > NAME_LEN {
            return Err(FieldError::NameTooLong(trimmed.to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        let bytes = upper.as_bytes();
        let valid_char = |b: &u8| b.is_ascii_uppercase() || b.is_ascii_digit() || b"$#@_.".contains(b);
        if bytes[0].is_ascii_digit() || !bytes.iter().all(valid_char) {
            return Err(FieldError::InvalidName(trimmed.to_string()));
        }

        let mut padded = [b' '; NAME_LEN];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(padded))
    }

    /// Decode a blank-padded name field from a record
    pub fn from_field(field: &[u8]) -> Result<Self, FieldError> {
        let text = std::str::from_utf8(field)
            .map_err(|_| FieldError::InvalidName(String::from_utf8_lossy(field).into_owned()))?;
        Self::parse(text)
    }

    /// The 10-byte blank-padded form used in records
    pub fn padded(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// The name without trailing blanks
    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII
        std::str::from_utf8(&self.0).unwrap_or_default().trim_end()
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Debug for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectName({})", self.as_str())
    }
}

/// Canonical `CYYMMDDHHmmSS` timestamp
///
/// `C` is `0` for the 1900s and `1` for the 2000s, so byte-wise ordering
/// of the 13 digits is chronological ordering.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalTimestamp([u8; TIMESTAMP_LEN]);

impl CanonicalTimestamp {
    /// Parse a 13-digit canonical timestamp
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        Self::from_field(raw.as_bytes())
    }

    /// Decode a 13-byte timestamp field from a record
    pub fn from_field(field: &[u8]) -> Result<Self, FieldError> {
        let digits: [u8; TIMESTAMP_LEN] = field
            .try_into()
            .map_err(|_| FieldError::InvalidTimestamp(String::from_utf8_lossy(field).into_owned()))?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(FieldError::InvalidTimestamp(
                String::from_utf8_lossy(field).into_owned(),
            ));
        }
        Ok(Self(digits))
    }

    pub fn as_bytes(&self) -> &[u8; TIMESTAMP_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for CanonicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CanonicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalTimestamp({})", self.as_str())
    }
}

/// A journal receiver as described by the receiver directory
///
/// Describes, but does not own, the receiver object in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    /// Receiver object name
    pub name: ObjectName,
    /// Library holding the receiver
    pub library: ObjectName,
    /// When the receiver was attached to the journal
    pub attached_at: CanonicalTimestamp,
}

impl Receiver {
    pub fn new(name: ObjectName, library: ObjectName, attached_at: CanonicalTimestamp) -> Self {
        Self {
            name,
            library,
            attached_at,
        }
    }
}

/// Journal identity: journal name qualified by its library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalId {
    pub journal: ObjectName,
    pub library: ObjectName,
}

impl JournalId {
    pub fn new(journal: ObjectName, library: ObjectName) -> Self {
        Self { journal, library }
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.library, self.journal)
    }
}
