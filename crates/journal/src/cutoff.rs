//! Oldest required journal entry (the retention cutoff)
//!
//! The queue manager records the timestamp of the oldest journal entry it
//! still needs for recovery in a small user space. Record layout (ASCII):
//!
//! ```text
//! journal[10] library[10] CC YY MM DD HH mm SS mmm
//! ```

use crate::error::MaintError;
use crate::receiver::{CanonicalTimestamp, FieldError, ObjectName, NAME_LEN, TIMESTAMP_LEN};
use crate::system::JournalSystem;

/// Length of the persisted oldest-entry record
pub const RECORD_LEN: usize = 2 * NAME_LEN + 7 * 2 + 3;

/// Persisted oldest-entry record, split into its fixed-width fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldestEntryRecord {
    pub journal: [u8; NAME_LEN],
    pub library: [u8; NAME_LEN],
    pub century: [u8; 2],
    pub year: [u8; 2],
    pub month: [u8; 2],
    pub day: [u8; 2],
    pub hour: [u8; 2],
    pub minute: [u8; 2],
    pub second: [u8; 2],
    pub millis: [u8; 3],
}

impl OldestEntryRecord {
    /// Split the leading `RECORD_LEN` bytes of a user space into fields
    pub fn parse(raw: &[u8]) -> Result<Self, String> {
        let raw = raw.get(..RECORD_LEN).ok_or_else(|| {
            format!("record is {} bytes, expected at least {}", raw.len(), RECORD_LEN)
        })?;

        let pair = |at: usize| [raw[at], raw[at + 1]];
        let mut journal = [0u8; NAME_LEN];
        let mut library = [0u8; NAME_LEN];
        journal.copy_from_slice(&raw[0..10]);
        library.copy_from_slice(&raw[10..20]);

        let record = Self {
            journal,
            library,
            century: pair(20),
            year: pair(22),
            month: pair(24),
            day: pair(26),
            hour: pair(28),
            minute: pair(30),
            second: pair(32),
            millis: [raw[34], raw[35], raw[36]],
        };

        if !raw[20..34].iter().all(u8::is_ascii_digit) {
            return Err(format!(
                "timestamp fields '{}' are not numeric",
                String::from_utf8_lossy(&raw[20..34])
            ));
        }
        Ok(record)
    }

    /// Normalise into the canonical `CYYMMDDHHmmSS` form
    ///
    /// A century field starting with `1` (the 1900s) maps to `0`; anything
    /// else maps to `1`. Milliseconds are dropped.
    pub fn canonical(&self) -> Result<CanonicalTimestamp, FieldError> {
        let mut digits = [0u8; TIMESTAMP_LEN];
        digits[0] = if self.century[0] == b'1' { b'0' } else { b'1' };
        let parts = [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ];
        for (i, part) in parts.iter().enumerate() {
            digits[1 + i * 2..3 + i * 2].copy_from_slice(part);
        }
        CanonicalTimestamp::from_field(&digits)
    }
}

/// Read and normalise the cutoff for the journal in `library`
pub fn resolve_cutoff(
    system: &dyn JournalSystem,
    space: &ObjectName,
    library: &ObjectName,
) -> Result<CanonicalTimestamp, MaintError> {
    let missing = |reason: String| MaintError::CutoffMissing {
        space: *space,
        library: *library,
        reason,
    };

    let raw = system
        .retrieve_cutoff(space, library)
        .map_err(|e| missing(e.to_string()))?;
    let record = OldestEntryRecord::parse(&raw).map_err(missing)?;
    record.canonical().map_err(|e| missing(e.to_string()))
}
