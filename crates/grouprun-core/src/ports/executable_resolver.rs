//! Executable resolution port.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from resolving an executable name.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No executable with this name exists on the search path.
    #[error("executable file not found in search path: {name}")]
    NotFound { name: String },

    /// An empty executable name was given.
    #[error("executable name cannot be empty")]
    EmptyName,
}

/// Resolves an executable name or path to an absolute path.
///
/// Resolution happens at run time, so a spec built before `PATH` changes
/// observes the new search path.
pub trait ExecutableResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError>;
}
