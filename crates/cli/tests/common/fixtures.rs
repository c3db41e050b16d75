//! Test store fixtures
//!
//! Builds a throwaway store root with one library, its journal manifest,
//! the oldest-entry record and receiver data files.

use anyhow::Result;
use cli_lib::store::{ChainManifest, ManifestReceiver};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LIBRARY: &str = "QMLIB";

/// A store root holding a single queue manager library
pub struct StoreFixture {
    temp_dir: TempDir,
}

impl StoreFixture {
    /// Create an empty store root (no libraries)
    pub fn empty() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Create a store with `receivers` (name, canonical attach time), oldest first
    pub fn with_chain(receivers: &[(&str, &str)]) -> Result<Self> {
        let fixture = Self::empty()?;
        fs::create_dir_all(fixture.library_dir())?;

        let manifest = ChainManifest {
            attached: None,
            receivers: receivers
                .iter()
                .enumerate()
                .map(|(i, (name, attached))| ManifestReceiver {
                    name: name.to_string(),
                    attached: attached.to_string(),
                    number: Some(i as u32 + 1),
                    size_kb: 64,
                    saved: None,
                })
                .collect(),
        };
        manifest.save(&fixture.manifest_path())?;

        for (name, _) in receivers {
            fs::write(fixture.receiver_path(name), b"receiver data")?;
        }
        Ok(fixture)
    }

    /// Six receivers attached at 06:00 on the first six days of January 2024
    pub fn standard() -> Result<Self> {
        Self::with_chain(&[
            ("AMQA000001", "1240101060000"),
            ("AMQA000002", "1240102060000"),
            ("AMQA000003", "1240103060000"),
            ("AMQA000004", "1240104060000"),
            ("AMQA000005", "1240105060000"),
            ("AMQA000006", "1240106060000"),
        ])
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn library_dir(&self) -> PathBuf {
        self.root().join(LIBRARY)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.library_dir().join("AMQAJRN.JRN.toml")
    }

    pub fn receiver_path(&self, name: &str) -> PathBuf {
        self.library_dir().join(format!("{}.JRNRCV", name))
    }

    pub fn message_queue_path(&self) -> PathBuf {
        self.library_dir().join("QMQMMSG.MSGQ")
    }

    /// Write the oldest-entry record with a `YYYYMMDDHHmmSSmmm` stamp
    pub fn set_oldest_entry(&self, stamp: &str) -> Result<()> {
        let record = format!("{:<10}{:<10}{}", "AMQAJRN", LIBRARY, stamp);
        fs::write(self.library_dir().join("AMQJRNINF.USRSPC"), record)?;
        Ok(())
    }

    /// Receiver names still in the chain manifest, oldest first
    pub fn chain_names(&self) -> Result<Vec<String>> {
        let manifest = ChainManifest::load(&self.manifest_path())?;
        Ok(manifest.receivers.into_iter().map(|r| r.name).collect())
    }

    /// Pin the attached receiver, which the store refuses to delete
    pub fn set_attached(&self, name: &str) -> Result<()> {
        let mut manifest = ChainManifest::load(&self.manifest_path())?;
        manifest.attached = Some(name.to_string());
        manifest.save(&self.manifest_path())?;
        Ok(())
    }
}
