//! Core domain types and port definitions for grouprun.
//!
//! This crate describes *what* to run and the collaborators a launcher
//! depends on. It contains no OS process code; `grouprun-runtime` provides
//! the implementations.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    CaptureBuffer, EnvironmentBlock, InputSource, OutputTarget, ProcessSpec, StreamReader,
    effective_environment,
};
pub use paths::{DATA_DIR_ENV, PathError, data_root, registry_dir, registry_dir_in};
pub use ports::{
    ExecutableResolver, KillRegistrar, KillSignal, NoopKillRegistrar, ProcessGroup,
    RegistrarError, Registration, ResolveError, RunError, StreamSink,
};
