//! Effective environment construction.
//!
//! The environment handed to a child is computed from the `ProcessSpec` and the
//! parent's environment at run time. Entries are ordered so that later ones
//! win under the usual "last assignment wins" lookup, which puts every
//! explicit `env` entry after anything inherited.

use std::ffi::{OsStr, OsString};

use super::process_spec::ProcessSpec;

/// Ordered `KEY=VALUE` pairs for a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentBlock {
    entries: Vec<(OsString, OsString)>,
}

impl EnvironmentBlock {
    pub fn entries(&self) -> &[(OsString, OsString)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value a child would observe for `key` (the last matching entry).
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Render as `KEY=VALUE` strings, in order.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect()
    }
}

impl IntoIterator for EnvironmentBlock {
    type Item = (OsString, OsString);
    type IntoIter = std::vec::IntoIter<(OsString, OsString)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Compute the environment for running `spec`.
///
/// Returns `None` when `spec` neither sets variables nor asks for
/// inheritance; the child then gets the OS default (the parent's environment,
/// untouched). Otherwise the block starts from `parent` iff
/// `spec.inherit_os_env`, followed by every `spec.env` entry in key order.
pub fn effective_environment<I, K, V>(spec: &ProcessSpec, parent: I) -> Option<EnvironmentBlock>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    if spec.env.is_empty() && !spec.inherit_os_env {
        return None;
    }

    let mut entries = Vec::new();
    if spec.inherit_os_env {
        entries.extend(parent.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    entries.extend(
        spec.env
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v))),
    );

    Some(EnvironmentBlock { entries })
}
