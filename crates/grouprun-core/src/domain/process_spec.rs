//! Process specification: a reusable description of one unit of work.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::streams::{InputSource, OutputTarget};

/// Description of an external program to run.
///
/// A spec is plain data. Running it never mutates it, so the same value can
/// be run any number of times, each run being an independent lifecycle.
///
/// # Example
///
/// ```
/// use grouprun_core::{CaptureBuffer, ProcessSpec};
///
/// let stdout = CaptureBuffer::new();
/// let spec = ProcessSpec::command("sh", ["-c", "echo \"$GREETING\""])
///     .with_env("GREETING", "hello")
///     .with_stdout(stdout.clone());
/// assert_eq!(spec.name, "sh");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessSpec {
    /// Human-readable label for logs and registry entries. Not an identity.
    pub name: String,
    /// Executable name or path, resolved against the search path at run time.
    pub path: String,
    /// Working directory for the child (inherits the parent's when `None`).
    pub working_dir: Option<PathBuf>,
    /// Positional arguments, passed in order.
    pub args: Vec<String>,
    /// Variables set for the child. They always win over inherited ones.
    pub env: BTreeMap<String, String>,
    /// Start from the parent's environment before applying `env`.
    pub inherit_os_env: bool,
    pub stdin: InputSource,
    pub stdout: OutputTarget,
    pub stderr: OutputTarget,
}

impl ProcessSpec {
    /// Create a spec for `cmd` with `args`, named after the command's base name.
    pub fn command<I, S>(cmd: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = cmd.into();
        let name = Path::new(&path)
            .file_name()
            .map_or_else(|| path.clone(), |n| n.to_string_lossy().into_owned());

        Self {
            name,
            path,
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set one variable. A repeated key replaces the earlier value.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn inherit_os_env(mut self, inherit: bool) -> Self {
        self.inherit_os_env = inherit;
        self
    }

    #[must_use]
    pub fn with_stdin(mut self, stdin: impl Into<InputSource>) -> Self {
        self.stdin = stdin.into();
        self
    }

    #[must_use]
    pub fn with_stdout(mut self, stdout: impl Into<OutputTarget>) -> Self {
        self.stdout = stdout.into();
        self
    }

    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<OutputTarget>) -> Self {
        self.stderr = stderr.into();
        self
    }
}
