//! Port definitions (trait abstractions) for the collaborators a launcher needs.
//!
//! Ports define the interfaces that the launcher expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `nix`/`tokio` types in any signature
//! - Collaborators are injected, never reached through globals
//! - Intent-based methods (register a kill, resolve a name)

pub mod executable_resolver;
pub mod kill_registrar;
pub mod stream_sink;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use executable_resolver::{ExecutableResolver, ResolveError};
pub use kill_registrar::{
    KillRegistrar, KillSignal, NoopKillRegistrar, ProcessGroup, RegistrarError, Registration,
    UnknownSignal,
};
pub use stream_sink::StreamSink;

/// Errors returned by a single run of a [`crate::ProcessSpec`].
///
/// `Exit` and `Signaled` describe a child that ran to completion; every
/// other variant is a launcher fault. Nothing is retried.
#[derive(Debug, Error)]
pub enum RunError {
    /// The cancellation token had already fired; nothing was started.
    #[error("run cancelled before the process was started")]
    Cancelled,

    /// The executable could not be resolved against the search path.
    #[error(transparent)]
    NotFound(#[from] ResolveError),

    /// The OS refused to create the process.
    #[error("failed to start {}: {source}", path.display())]
    Start {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input file for the child's stdin could not be opened.
    #[error("failed to open {stream} source {}: {source}", path.display())]
    Stream {
        stream: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The crash-safety registration failed after the process had started.
    #[error("failed to register killer: {0}")]
    Registration(#[from] RegistrarError),

    /// The process exited with a non-zero status code.
    #[error("process exited with status {code}")]
    Exit { code: i32 },

    /// The process was terminated by a signal.
    #[error("process terminated by signal {signal}")]
    Signaled { signal: i32 },

    /// Observing the process exit failed.
    #[error("failed to wait for process: {0}")]
    Wait(#[source] io::Error),
}

impl RunError {
    /// Exit code of the child, if it ran and exited non-zero.
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code } => Some(*code),
            _ => None,
        }
    }

    /// Whether the child actually ran (as opposed to a launcher fault).
    pub const fn is_child_failure(&self) -> bool {
        matches!(self, Self::Exit { .. } | Self::Signaled { .. })
    }
}
