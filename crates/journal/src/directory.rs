//! Receiver directory loader
//!
//! The journaling subsystem returns the receiver chain as a chained buffer:
//!
//! ```text
//! journal header (48)
//!   bytes_returned u32, bytes_available u32,
//!   journal[10], journal library[10],
//!   attached receiver[10], attached receiver library[10]
//! key header (20)
//!   key u32 (=1), offset_to_key_info u32, header_len u32,
//!   number_entries u32, entry_len u32
//! key 1 output section (16), at key header + offset_to_key_info
//!   total_receivers u32, total_size_kb u32, reserved[8]
//! entries, entry_len bytes each (>= 64)
//!   name[10], library[10], number[5], attached[13], status[1],
//!   saved[13], size_kb u32, reserved[8]
//! ```
//!
//! Integers are big-endian. `number_entries` is the true chain length even
//! when fewer entries fit in the buffer. Nothing outside this module sees an
//! offset.

use crate::error::{MaintError, MalformedDirectory};
use crate::receiver::{CanonicalTimestamp, JournalId, ObjectName, Receiver, NAME_LEN, TIMESTAMP_LEN};
use crate::report::Reporter;
use crate::system::JournalSystem;
use tracing::debug;

/// Maximum number of receivers processed in one run
pub const MAX_CHAIN: usize = 256;

pub const HEADER_LEN: usize = 48;
pub const KEY_HEADER_LEN: usize = 20;
pub const KEY1_SECTION_LEN: usize = 16;
pub const ENTRY_LEN: usize = 64;

const KEY_RECEIVER_DIRECTORY: u32 = 1;

/// One receiver entry as carried in the directory buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: ObjectName,
    pub library: ObjectName,
    /// Five-digit receiver sequence number, blank if unknown
    pub number: [u8; 5],
    pub attached_at: CanonicalTimestamp,
    /// Status code character (`1` attached, `2` online, ...)
    pub status: u8,
    pub saved_at: Option<CanonicalTimestamp>,
    pub size_kb: u32,
}

impl DirectoryEntry {
    pub fn new(name: ObjectName, library: ObjectName, attached_at: CanonicalTimestamp) -> Self {
        Self {
            name,
            library,
            number: *b"     ",
            attached_at,
            status: b'2',
            saved_at: None,
            size_kb: 0,
        }
    }

    pub fn to_receiver(&self) -> Receiver {
        Receiver::new(self.name, self.library, self.attached_at)
    }
}

/// A decoded receiver directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverDirectory {
    pub journal: JournalId,
    /// Receiver currently attached to the journal
    pub attached: ObjectName,
    /// Chain length declared by the subsystem
    pub declared_count: usize,
    /// Entries decoded from the buffer, oldest first, at most `MAX_CHAIN`
    pub entries: Vec<DirectoryEntry>,
}

impl ReceiverDirectory {
    /// Whether the declared chain was longer than what was decoded
    pub fn is_truncated(&self) -> bool {
        self.declared_count > self.entries.len()
    }

    /// Encode into the subsystem buffer layout, writing at most `capacity` entries
    pub fn encode(&self, capacity: usize) -> Vec<u8> {
        let written = self.entries.len().min(capacity);
        let total = HEADER_LEN + KEY_HEADER_LEN + KEY1_SECTION_LEN + written * ENTRY_LEN;
        let available = HEADER_LEN + KEY_HEADER_LEN + KEY1_SECTION_LEN + self.declared_count * ENTRY_LEN;

        let mut buf = Vec::with_capacity(total);
        put_u32(&mut buf, total as u32);
        put_u32(&mut buf, available as u32);
        buf.extend_from_slice(self.journal.journal.padded());
        buf.extend_from_slice(self.journal.library.padded());
        buf.extend_from_slice(self.attached.padded());
        buf.extend_from_slice(self.journal.library.padded());

        put_u32(&mut buf, KEY_RECEIVER_DIRECTORY);
        put_u32(&mut buf, KEY_HEADER_LEN as u32);
        put_u32(&mut buf, KEY_HEADER_LEN as u32);
        put_u32(&mut buf, self.declared_count as u32);
        put_u32(&mut buf, ENTRY_LEN as u32);

        let total_kb: u32 = self.entries.iter().map(|e| e.size_kb).sum();
        put_u32(&mut buf, self.declared_count as u32);
        put_u32(&mut buf, total_kb);
        buf.extend_from_slice(&[0u8; 8]);

        for entry in &self.entries[..written] {
            buf.extend_from_slice(entry.name.padded());
            buf.extend_from_slice(entry.library.padded());
            buf.extend_from_slice(&entry.number);
            buf.extend_from_slice(entry.attached_at.as_bytes());
            buf.push(entry.status);
            match &entry.saved_at {
                Some(ts) => buf.extend_from_slice(ts.as_bytes()),
                None => buf.extend_from_slice(&[b'0'; TIMESTAMP_LEN]),
            }
            put_u32(&mut buf, entry.size_kb);
            buf.extend_from_slice(&[0u8; 8]);
        }

        debug_assert_eq!(buf.len(), total);
        buf
    }

    /// Decode a subsystem buffer, keeping at most `max_entries` receivers
    pub fn decode(buf: &[u8], max_entries: usize) -> Result<Self, MalformedDirectory> {
        let reader = Reader { buf };
        if buf.len() < HEADER_LEN + KEY_HEADER_LEN {
            return Err(MalformedDirectory::ShortHeader {
                len: buf.len(),
                needed: HEADER_LEN + KEY_HEADER_LEN,
            });
        }

        let journal = JournalId::new(reader.name(8)?, reader.name(18)?);
        let attached = reader.name(28)?;

        let key_hdr = HEADER_LEN;
        let key = reader.u32(key_hdr, "key header")?;
        if key != KEY_RECEIVER_DIRECTORY {
            return Err(MalformedDirectory::UnexpectedKey(key));
        }
        let key_info_offset = reader.u32(key_hdr + 4, "key header")? as usize;
        let declared_count = reader.u32(key_hdr + 12, "key header")? as usize;
        let entry_len = reader.u32(key_hdr + 16, "key header")?;
        if (entry_len as usize) < ENTRY_LEN {
            return Err(MalformedDirectory::EntryTooShort(entry_len));
        }
        let entry_len = entry_len as usize;

        let section = key_hdr + key_info_offset;
        reader.span(section, KEY1_SECTION_LEN, "key 1 output section")?;
        let first_entry = section + KEY1_SECTION_LEN;

        let count = declared_count.min(max_entries);
        reader.span(first_entry, count * entry_len, "receiver entries")?;

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| MalformedDirectory::OutOfMemory(count))?;

        for index in 0..count {
            let at = first_entry + index * entry_len;
            let entry = reader
                .entry(at)
                .map_err(|source| MalformedDirectory::BadEntry { index, source })?;
            entries.push(entry);
        }

        Ok(Self {
            journal,
            attached,
            declared_count,
            entries,
        })
    }
}

/// Bounds-checked field access over a directory buffer
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn span(&self, offset: usize, len: usize, what: &'static str) -> Result<&'a [u8], MalformedDirectory> {
        offset
            .checked_add(len)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or(MalformedDirectory::OutOfBounds {
                what,
                offset,
                len: self.buf.len(),
            })
    }

    fn u32(&self, offset: usize, what: &'static str) -> Result<u32, MalformedDirectory> {
        let bytes = self.span(offset, 4, what)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn name(&self, offset: usize) -> Result<ObjectName, MalformedDirectory> {
        let field = self.span(offset, NAME_LEN, "journal header")?;
        ObjectName::from_field(field).map_err(MalformedDirectory::BadHeader)
    }

    fn entry(&self, at: usize) -> Result<DirectoryEntry, crate::receiver::FieldError> {
        let raw = &self.buf[at..at + ENTRY_LEN];
        // Save time is informational; blank or garbled means never saved
        let saved_at = CanonicalTimestamp::from_field(&raw[39..52])
            .ok()
            .filter(|ts| ts.as_bytes().iter().any(|&b| b != b'0'));
        Ok(DirectoryEntry {
            name: ObjectName::from_field(&raw[0..10])?,
            library: ObjectName::from_field(&raw[10..20])?,
            number: [raw[20], raw[21], raw[22], raw[23], raw[24]],
            attached_at: CanonicalTimestamp::from_field(&raw[25..38])?,
            status: raw[38],
            saved_at,
            size_kb: u32::from_be_bytes([raw[52], raw[53], raw[54], raw[55]]),
        })
    }
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Load the receiver chain for `journal`, oldest receiver first
///
/// Chains longer than [`MAX_CHAIN`] are clamped to their first `MAX_CHAIN`
/// entries with a warning; the run continues on the clamped set.
pub fn load_chain(
    system: &dyn JournalSystem,
    journal: &JournalId,
    reporter: &mut Reporter<'_>,
) -> Result<Vec<Receiver>, MaintError> {
    let buf = system
        .retrieve_chain(journal, MAX_CHAIN)
        .map_err(|e| MaintError::RetrieveFailed(e.to_string()))?;
    debug!("Retrieved {} byte receiver directory for {}", buf.len(), journal);

    let directory = ReceiverDirectory::decode(&buf, MAX_CHAIN)?;
    drop(buf);

    reporter.line(format!(
        "Processing {} receivers for {} in {:<10}",
        directory.declared_count, journal.journal, journal.library
    ));
    if directory.is_truncated() {
        reporter.line(format!(
            "WARNING - More than {} receivers found - not all will be processed",
            MAX_CHAIN
        ));
    }

    let mut chain = Vec::new();
    chain
        .try_reserve_exact(directory.entries.len())
        .map_err(|_| MaintError::AllocationFailure("receiver chain"))?;
    chain.extend(directory.entries.iter().map(DirectoryEntry::to_receiver));

    reporter.line(format!("Attached receiver name: {:<10}", directory.attached));
    Ok(chain)
}
