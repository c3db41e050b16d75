//! Error taxonomy for a maintenance run

use crate::receiver::{FieldError, ObjectName};

/// Process exit status reported by a maintenance run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    InvalidArguments,
    LibraryNotFound,
    CutoffMissing,
    OutOfMemory,
    RetrieveFailed,
    DeletionHalted,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::InvalidArguments => 1,
            ExitStatus::LibraryNotFound => 2,
            ExitStatus::CutoffMissing => 3,
            ExitStatus::OutOfMemory => 4,
            ExitStatus::RetrieveFailed => 5,
            ExitStatus::DeletionHalted => 6,
        }
    }
}

/// Failure reported by the journaling subsystem
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object {0}")]
    Invalid(String),
}

/// Why a receiver directory buffer could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedDirectory {
    #[error("buffer is {len} bytes, shorter than the {needed}-byte header")]
    ShortHeader { len: usize, needed: usize },
    #[error("journal header: {0}")]
    BadHeader(#[source] FieldError),
    #[error("unexpected key {0} in key section (expected 1)")]
    UnexpectedKey(u32),
    #[error("receiver entry length {0} is below the 64-byte minimum")]
    EntryTooShort(u32),
    #[error("{what} at offset {offset} runs past the {len}-byte buffer")]
    OutOfBounds {
        what: &'static str,
        offset: usize,
        len: usize,
    },
    #[error("out of memory reserving {0} receiver entries")]
    OutOfMemory(usize),
    #[error("receiver entry {index}: {source}")]
    BadEntry {
        index: usize,
        #[source]
        source: FieldError,
    },
}

/// Errors that end or degrade a maintenance run
#[derive(Debug, thiserror::Error)]
pub enum MaintError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("journal library {0} not found")]
    JournalContainerNotFound(ObjectName),

    #[error("oldest journal entry record ({space}) unavailable in library {library}: {reason}")]
    CutoffMissing {
        space: ObjectName,
        library: ObjectName,
        reason: String,
    },

    #[error("out of memory allocating {0}")]
    AllocationFailure(&'static str),

    #[error("failed to retrieve receiver directory: {0}")]
    RetrieveFailed(String),

    #[error("failed to delete receiver {receiver} (status {status})")]
    DeleteFailed { receiver: ObjectName, status: i32 },
}

impl MaintError {
    /// Exit status this error maps to
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            MaintError::InvalidArguments(_) => ExitStatus::InvalidArguments,
            MaintError::JournalContainerNotFound(_) => ExitStatus::LibraryNotFound,
            MaintError::CutoffMissing { .. } => ExitStatus::CutoffMissing,
            MaintError::AllocationFailure(_) => ExitStatus::OutOfMemory,
            MaintError::RetrieveFailed(_) => ExitStatus::RetrieveFailed,
            MaintError::DeleteFailed { .. } => ExitStatus::DeletionHalted,
        }
    }
}

impl From<MalformedDirectory> for MaintError {
    fn from(err: MalformedDirectory) -> Self {
        match err {
            MalformedDirectory::OutOfMemory(_) => MaintError::AllocationFailure("receiver directory"),
            other => MaintError::RetrieveFailed(other.to_string()),
        }
    }
}
