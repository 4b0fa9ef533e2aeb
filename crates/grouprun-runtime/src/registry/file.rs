//! File-backed `KillRegistrar`.

use std::path::{Path, PathBuf};

use grouprun_core::{
    KillRegistrar, KillSignal, ProcessGroup, RegistrarError, Registration, registry_dir,
};
use tracing::debug;
use uuid::Uuid;

use super::io::{RegistryEntry, delete_entry, list_entries, write_entry};

/// Kill registrar keeping one file per pending action under `dir`.
///
/// Registering writes `<uuid>.kill`; releasing deletes it. If the owning
/// process dies first, the file stays behind for [`super::sweep_orphaned_groups`].
///
/// Cloning is cheap and every clone writes to the same directory, so one
/// registry can be shared by all concurrent runs in a process.
#[derive(Debug, Clone)]
pub struct FileKillRegistry {
    dir: PathBuf,
    owner_pid: u32,
}

impl FileKillRegistry {
    /// Create a registry rooted at `dir`. The directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            owner_pid: std::process::id(),
        }
    }

    /// Create a registry at the default location (see [`registry_dir`]).
    pub fn open_default() -> Result<Self, RegistrarError> {
        Ok(Self::new(registry_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entries registered by this process and not yet released.
    pub fn pending(&self) -> Result<Vec<RegistryEntry>, RegistrarError> {
        Ok(list_entries(&self.dir)?
            .into_iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.owner_pid == self.owner_pid)
            .collect())
    }
}

impl KillRegistrar for FileKillRegistry {
    fn register(
        &self,
        label: &str,
        target: ProcessGroup,
        signal: KillSignal,
    ) -> Result<Registration, RegistrarError> {
        let entry = RegistryEntry {
            owner_pid: self.owner_pid,
            target,
            signal,
            label: label.to_string(),
        };

        let id = Uuid::new_v4().to_string();
        let path = write_entry(&self.dir, &id, &entry)?;
        debug!(name = %label, pgid = %target, %signal, path = %path.display(), "registered kill action");

        let release_label = label.to_string();
        Ok(Registration::new(label, move || {
            delete_entry(&path)?;
            debug!(name = %release_label, path = %path.display(), "released kill action");
            Ok(())
        }))
    }
}
