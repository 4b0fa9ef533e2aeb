//! Path-related error types.

use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// The data directory override was set but empty.
    #[error("{0} is set but empty")]
    EmptyOverride(&'static str),
}
