//! Kill registry directory path resolution.
//!
//! Provides the canonical location for pending crash-safety registrations.

use std::path::{Path, PathBuf};

use super::PathError;
use super::platform::data_root;

/// Returns the directory where pending kill registrations are stored.
///
/// Location: `<data root>/kills/`
///
/// Every entry in this directory is a kill action that has not been released
/// by its owner yet. Entries whose owner has died are swept by the recovery
/// path in `grouprun-runtime`.
pub fn registry_dir() -> Result<PathBuf, PathError> {
    Ok(registry_dir_in(&data_root()?))
}

/// Registry directory below an explicit data root.
pub fn registry_dir_in(root: &Path) -> PathBuf {
    root.join("kills")
}
