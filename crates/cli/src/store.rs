//! Filesystem-backed journaling subsystem
//!
//! Lays a queue manager's journal out under a store root:
//!
//! ```text
//! <root>/
//!   <LIBRARY>/
//!     AMQAJRN.JRN.toml     receiver chain manifest
//!     AMQJRNINF.USRSPC     oldest-entry record
//!     AMQA000001.JRNRCV    receiver data
//!     QMQMMSG.MSGQ         message queue
//! ```

use journal::{
    CanonicalTimestamp, DirectoryEntry, FieldError, JournalId, JournalSystem, ObjectName,
    ReceiverDirectory, SystemError,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Status for a delete the subsystem refused
pub const STATUS_REFUSED: i32 = 1;

/// Status for a delete of a receiver not in the chain
pub const STATUS_NOT_IN_CHAIN: i32 = 2;

/// One receiver in the chain manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestReceiver {
    pub name: String,
    /// Canonical `CYYMMDDHHmmSS` attach timestamp
    pub attached: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default)]
    pub size_kb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<String>,
}

/// Receiver chain of one journal, oldest receiver first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainManifest {
    /// Currently attached receiver (defaults to the newest)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached: Option<String>,
    #[serde(default, rename = "receiver")]
    pub receivers: Vec<ManifestReceiver>,
}

impl ChainManifest {
    pub fn load(path: &Path) -> Result<Self, SystemError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SystemError::NotFound(path.display().to_string()),
            _ => SystemError::Io(e),
        })?;
        toml::from_str(&text).map_err(|e| SystemError::Invalid(format!("{}: {}", path.display(), e)))
    }

    /// Write the manifest, replacing the old one atomically
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)
    }

    /// Name of the currently attached receiver
    pub fn attached_name(&self) -> Option<&str> {
        self.attached
            .as_deref()
            .or_else(|| self.receivers.last().map(|r| r.name.as_str()))
    }

    fn to_directory(&self, journal: &JournalId) -> Result<ReceiverDirectory, SystemError> {
        let invalid = |e: FieldError| SystemError::Invalid(e.to_string());

        let mut entries = Vec::with_capacity(self.receivers.len());
        for receiver in &self.receivers {
            let mut entry = DirectoryEntry::new(
                ObjectName::parse(&receiver.name).map_err(invalid)?,
                journal.library,
                CanonicalTimestamp::parse(&receiver.attached).map_err(invalid)?,
            );
            if let Some(number) = receiver.number {
                let digits = format!("{:05}", number % 100_000);
                entry.number.copy_from_slice(digits.as_bytes());
            }
            if let Some(saved) = &receiver.saved {
                entry.saved_at = Some(CanonicalTimestamp::parse(saved).map_err(invalid)?);
            }
            entry.size_kb = receiver.size_kb;
            entries.push(entry);
        }

        let attached = self
            .attached_name()
            .ok_or_else(|| SystemError::Invalid(format!("journal {} has no receivers", journal)))?;
        let attached = ObjectName::parse(attached).map_err(invalid)?;
        for entry in &mut entries {
            entry.status = if entry.name == attached { b'1' } else { b'2' };
        }

        Ok(ReceiverDirectory {
            journal: *journal,
            attached,
            declared_count: entries.len(),
            entries,
        })
    }
}

/// Journaling subsystem over a directory tree
#[derive(Debug, Clone)]
pub struct FsJournalSystem {
    root: PathBuf,
}

impl FsJournalSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn library_dir(&self, library: &ObjectName) -> PathBuf {
        self.root.join(library.as_str())
    }

    pub fn manifest_path(&self, journal: &JournalId) -> PathBuf {
        self.library_dir(&journal.library)
            .join(format!("{}.JRN.toml", journal.journal))
    }

    pub fn space_path(&self, space: &ObjectName, library: &ObjectName) -> PathBuf {
        self.library_dir(library).join(format!("{}.USRSPC", space))
    }

    pub fn receiver_path(&self, library: &ObjectName, receiver: &ObjectName) -> PathBuf {
        self.library_dir(library).join(format!("{}.JRNRCV", receiver))
    }

    pub fn message_queue_path(&self, queue: &ObjectName, library: &ObjectName) -> PathBuf {
        self.library_dir(library).join(format!("{}.MSGQ", queue))
    }

    /// Every journal manifest in `library`
    fn manifests_in(&self, library: &ObjectName) -> io::Result<Vec<PathBuf>> {
        let mut manifests = Vec::new();
        for entry in fs::read_dir(self.library_dir(library))? {
            let path = entry?.path();
            if path.to_string_lossy().ends_with(".JRN.toml") {
                manifests.push(path);
            }
        }
        manifests.sort();
        Ok(manifests)
    }

    fn remove_from_chain(&self, library: &ObjectName, receiver: &ObjectName) -> Result<(), i32> {
        let manifests = self.manifests_in(library).map_err(|e| io_status(&e))?;
        for path in manifests {
            let mut manifest = ChainManifest::load(&path).map_err(|e| {
                warn!("Unreadable chain manifest {}: {}", path.display(), e);
                STATUS_REFUSED
            })?;

            let Some(position) = manifest
                .receivers
                .iter()
                .position(|r| r.name.eq_ignore_ascii_case(receiver.as_str()))
            else {
                continue;
            };

            let attached = manifest.attached_name().map(str::to_ascii_uppercase);
            if attached.as_deref() == Some(receiver.as_str()) {
                warn!("Refusing to delete attached receiver {}", receiver);
                return Err(STATUS_REFUSED);
            }

            let data = self.receiver_path(library, receiver);
            match fs::remove_file(&data) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Receiver {} has no data file", receiver);
                }
                Err(e) => return Err(io_status(&e)),
            }

            manifest.receivers.remove(position);
            return manifest.save(&path).map_err(|e| io_status(&e));
        }

        Err(STATUS_NOT_IN_CHAIN)
    }
}

fn io_status(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(STATUS_REFUSED)
}

impl JournalSystem for FsJournalSystem {
    fn library_exists(&self, library: &ObjectName) -> bool {
        self.library_dir(library).is_dir()
    }

    fn retrieve_chain(&self, journal: &JournalId, capacity: usize) -> Result<Vec<u8>, SystemError> {
        let path = self.manifest_path(journal);
        debug!("Reading receiver chain from {}", path.display());
        let manifest = ChainManifest::load(&path)?;
        Ok(manifest.to_directory(journal)?.encode(capacity))
    }

    fn retrieve_cutoff(&self, space: &ObjectName, library: &ObjectName) -> Result<Vec<u8>, SystemError> {
        let path = self.space_path(space, library);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SystemError::NotFound(path.display().to_string()),
            _ => SystemError::Io(e),
        })
    }

    fn delete_receiver(&self, library: &ObjectName, receiver: &ObjectName) -> Result<(), i32> {
        debug!("DLTJRNRCV {}/{} DLTOPT(*IGNINQMSG)", library, receiver);
        self.remove_from_chain(library, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal::MAX_CHAIN;
    use tempfile::TempDir;

    fn name(s: &str) -> ObjectName {
        ObjectName::parse(s).unwrap()
    }

    fn journal_id() -> JournalId {
        JournalId::new(name("AMQAJRN"), name("QMLIB"))
    }

    fn setup(receivers: &[(&str, &str)]) -> (TempDir, FsJournalSystem) {
        let temp_dir = TempDir::new().unwrap();
        let system = FsJournalSystem::new(temp_dir.path());
        fs::create_dir_all(system.library_dir(&name("QMLIB"))).unwrap();

        let manifest = ChainManifest {
            attached: None,
            receivers: receivers
                .iter()
                .map(|(n, ts)| ManifestReceiver {
                    name: n.to_string(),
                    attached: ts.to_string(),
                    number: None,
                    size_kb: 16,
                    saved: None,
                })
                .collect(),
        };
        manifest.save(&system.manifest_path(&journal_id())).unwrap();
        for (n, _) in receivers {
            fs::write(system.receiver_path(&name("QMLIB"), &name(n)), b"data").unwrap();
        }
        (temp_dir, system)
    }

    #[test]
    fn test_chain_round_trips_through_directory_buffer() {
        let (_dir, system) = setup(&[("AMQA000001", "1240101000000"), ("AMQA000002", "1240201000000")]);
        let buf = system.retrieve_chain(&journal_id(), MAX_CHAIN).unwrap();
        let directory = ReceiverDirectory::decode(&buf, MAX_CHAIN).unwrap();

        assert_eq!(directory.entries.len(), 2);
        assert_eq!(directory.attached, name("AMQA000002"));
        assert_eq!(directory.entries[0].status, b'2');
        assert_eq!(directory.entries[1].status, b'1');
        assert_eq!(directory.entries[1].size_kb, 16);
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let system = FsJournalSystem::new(temp_dir.path());
        assert!(matches!(
            system.retrieve_chain(&journal_id(), MAX_CHAIN),
            Err(SystemError::NotFound(_))
        ));
        assert!(!system.library_exists(&name("QMLIB")));
    }

    #[test]
    fn test_bad_timestamp_in_manifest_is_invalid() {
        let (_dir, system) = setup(&[("AMQA000001", "2024-01-01")]);
        assert!(matches!(
            system.retrieve_chain(&journal_id(), MAX_CHAIN),
            Err(SystemError::Invalid(_))
        ));
    }

    #[test]
    fn test_delete_removes_data_and_chain_entry() {
        let (_dir, system) = setup(&[("AMQA000001", "1240101000000"), ("AMQA000002", "1240201000000")]);
        let library = name("QMLIB");

        system.delete_receiver(&library, &name("AMQA000001")).unwrap();

        assert!(!system.receiver_path(&library, &name("AMQA000001")).exists());
        let manifest = ChainManifest::load(&system.manifest_path(&journal_id())).unwrap();
        assert_eq!(manifest.receivers.len(), 1);
        assert_eq!(manifest.receivers[0].name, "AMQA000002");
    }

    #[test]
    fn test_delete_refuses_attached_receiver() {
        let (_dir, system) = setup(&[("AMQA000001", "1240101000000"), ("AMQA000002", "1240201000000")]);
        assert_eq!(
            system.delete_receiver(&name("QMLIB"), &name("AMQA000002")),
            Err(STATUS_REFUSED)
        );
        assert!(system.receiver_path(&name("QMLIB"), &name("AMQA000002")).exists());
    }

    #[test]
    fn test_delete_unknown_receiver() {
        let (_dir, system) = setup(&[("AMQA000001", "1240101000000")]);
        assert_eq!(
            system.delete_receiver(&name("QMLIB"), &name("AMQA999999")),
            Err(STATUS_NOT_IN_CHAIN)
        );
    }

    #[test]
    fn test_cutoff_space_is_read_raw() {
        let (_dir, system) = setup(&[("AMQA000001", "1240101000000")]);
        let space = name("AMQJRNINF");
        let library = name("QMLIB");
        assert!(matches!(
            system.retrieve_cutoff(&space, &library),
            Err(SystemError::NotFound(_))
        ));

        fs::write(system.space_path(&space, &library), b"AMQAJRN   QMLIB     20240110000000000").unwrap();
        assert_eq!(system.retrieve_cutoff(&space, &library).unwrap().len(), 37);
    }
}
