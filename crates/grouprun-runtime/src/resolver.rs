//! Executable resolution against the search path.

use std::path::PathBuf;

use grouprun_core::{ExecutableResolver, ResolveError};
use tracing::debug;

/// Resolves executables the way a shell would, using `PATH`.
///
/// Names containing a path separator are checked directly instead of being
/// searched for.
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver;

impl ExecutableResolver for SearchPathResolver {
    fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        if name.is_empty() {
            return Err(ResolveError::EmptyName);
        }

        which::which(name).map_err(|e| {
            debug!(%name, error = %e, "executable lookup failed");
            ResolveError::NotFound {
                name: name.to_string(),
            }
        })
    }
}
