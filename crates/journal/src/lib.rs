//! Journal receiver retention maintenance
//!
//! This crate provides:
//! - Receiver names and canonical attach timestamps
//! - Receiver directory buffer decoding (and encoding for hosts)
//! - Oldest-required-entry cutoff resolution
//! - Keep/delete classification of a receiver chain
//! - The maintenance run: oldest-first deletion, halting on failure

pub mod cutoff;
pub mod directory;
pub mod error;
pub mod maintenance;
pub mod receiver;
pub mod report;
pub mod retention;
pub mod system;

// Re-exports
pub use cutoff::{resolve_cutoff, OldestEntryRecord};
pub use directory::{load_chain, DirectoryEntry, ReceiverDirectory, MAX_CHAIN};
pub use error::{ExitStatus, MaintError, MalformedDirectory, SystemError};
pub use maintenance::{delete_before_boundary, Maintenance, OutputMode, RunConfig, RunState, RunSummary};
pub use receiver::{CanonicalTimestamp, FieldError, JournalId, ObjectName, Receiver};
pub use report::{MemorySink, ReportSink, Reporter};
pub use retention::{classify, RetentionPlan, Verdict};
pub use system::JournalSystem;

/// Result type for maintenance operations
pub type Result<T> = std::result::Result<T, MaintError>;
