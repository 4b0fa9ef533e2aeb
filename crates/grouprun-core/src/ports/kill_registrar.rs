//! Crash-safety registrar port.
//!
//! A registrar records "deliver this signal to that process group if I die
//! without releasing it". The launcher registers right after a successful
//! start and releases once the child has been reaped. Implementations decide
//! how the pending action survives the registering process; this port only
//! exposes the register/release pair.

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::paths::PathError;

/// An OS process group, addressed as a unit.
///
/// The launcher puts every child in a group whose id equals the child's pid,
/// so signalling the group reaches every descendant the child spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessGroup(u32);

impl ProcessGroup {
    pub const fn new(pgid: u32) -> Self {
        Self(pgid)
    }

    /// The group id (equal to the leader's pid).
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signals a registrar may deliver to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KillSignal {
    /// Cooperative interrupt (`SIGINT`).
    Interrupt,
    /// Polite termination request (`SIGTERM`).
    Terminate,
    /// Forced kill (`SIGKILL`), cannot be caught or ignored.
    Kill,
}

impl KillSignal {
    /// Stable name used in durable registry entries.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Kill => "SIGKILL",
        }
    }
}

impl fmt::Display for KillSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signal name that is not one of [`KillSignal`]'s.
#[derive(Debug, Error)]
#[error("unknown signal name: {0}")]
pub struct UnknownSignal(pub String);

impl FromStr for KillSignal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SIGINT" | "INT" => Ok(Self::Interrupt),
            "SIGTERM" | "TERM" => Ok(Self::Terminate),
            "SIGKILL" | "KILL" => Ok(Self::Kill),
            other => Err(UnknownSignal(other.to_string())),
        }
    }
}

/// Errors from registering or releasing a pending kill action.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Reading or writing durable registry state failed.
    #[error("registry I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The registry location could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A durable entry could not be parsed.
    #[error("invalid registry entry: {0}")]
    InvalidEntry(String),
}

type ReleaseFn = Box<dyn FnOnce() -> Result<(), RegistrarError> + Send>;

/// Scoped handle to a pending kill action.
///
/// The release action runs at most once: either through [`Registration::release`]
/// or, if that is never called, when the handle is dropped. Whichever path
/// gets there first wins and the other becomes a no-op.
/// [`Registration::persist`] discards the handle without releasing.
pub struct Registration {
    label: String,
    release: Option<ReleaseFn>,
}

impl Registration {
    /// Create a registration whose release runs `release`.
    pub fn new(
        label: impl Into<String>,
        release: impl FnOnce() -> Result<(), RegistrarError> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            release: Some(Box::new(release)),
        }
    }

    /// Create a registration with nothing to release.
    pub fn noop(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            release: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the release action is still pending.
    pub const fn is_armed(&self) -> bool {
        self.release.is_some()
    }

    /// Give up the handle but leave the kill action pending.
    ///
    /// Used when the child may outlive its supervision; whoever recovers
    /// orphaned registrations delivers the signal.
    pub fn persist(mut self) {
        if self.release.take().is_some() {
            debug!(label = %self.label, "kill registration persisted");
        }
    }

    /// Remove the pending kill action now, reporting any failure.
    pub fn release(mut self) -> Result<(), RegistrarError> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(release) = self.release.take()
            && let Err(e) = release()
        {
            warn!(label = %self.label, error = %e, "failed to release kill registration");
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("label", &self.label)
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// Process-wide registry of pending kill actions.
///
/// Implementations must tolerate concurrent `register` calls from many runs;
/// each call owns exactly one entry and must not disturb another's.
pub trait KillRegistrar: Send + Sync {
    /// Arrange for `signal` to reach `target` if the calling process exits
    /// without releasing the returned registration.
    fn register(
        &self,
        label: &str,
        target: ProcessGroup,
        signal: KillSignal,
    ) -> Result<Registration, RegistrarError>;
}

/// A registrar that records nothing.
///
/// Useful when crash safety is handled elsewhere (or not wanted at all);
/// children still receive the cooperative interrupt on cancellation.
#[derive(Debug, Clone, Default)]
pub struct NoopKillRegistrar;

impl KillRegistrar for NoopKillRegistrar {
    fn register(
        &self,
        label: &str,
        _target: ProcessGroup,
        _signal: KillSignal,
    ) -> Result<Registration, RegistrarError> {
        Ok(Registration::noop(label))
    }
}
