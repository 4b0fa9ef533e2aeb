//! Platform-specific data root resolution.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "GROUPRUN_DATA_DIR";

/// Get the root directory for grouprun state.
///
/// Resolution order:
/// 1. `GROUPRUN_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/grouprun`)
pub fn data_root() -> Result<PathBuf, PathError> {
    // 1. Runtime override
    if let Some(path) = env::var_os(DATA_DIR_ENV) {
        if path.is_empty() {
            return Err(PathError::EmptyOverride(DATA_DIR_ENV));
        }
        return Ok(PathBuf::from(path));
    }

    // 2. System data directory
    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("grouprun"))
}
