//! Contract with the journaling subsystem

use crate::error::SystemError;
use crate::receiver::{JournalId, ObjectName};

/// Operations a maintenance run needs from the host journaling subsystem
///
/// All calls are blocking. Implementations own the meaning of a status
/// code; the run only distinguishes zero from non-zero.
pub trait JournalSystem {
    /// Whether the library holding the journal exists
    fn library_exists(&self, library: &ObjectName) -> bool;

    /// Retrieve the receiver directory buffer for `journal`
    ///
    /// At most `capacity` receiver entries are written into the buffer; the
    /// declared entry count still reports the full chain length.
    fn retrieve_chain(&self, journal: &JournalId, capacity: usize) -> Result<Vec<u8>, SystemError>;

    /// Read the persisted oldest-required-entry record from the named space
    fn retrieve_cutoff(&self, space: &ObjectName, library: &ObjectName) -> Result<Vec<u8>, SystemError>;

    /// Delete one receiver, returning the non-zero status on failure
    fn delete_receiver(&self, library: &ObjectName, receiver: &ObjectName) -> Result<(), i32>;
}
