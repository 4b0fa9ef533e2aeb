//! Path utilities for grouprun data directories.
//!
//! This module provides the canonical path resolution for the durable
//! kill registry shared by every launcher in a process (and by the
//! watchdog that recovers it after a crash).
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Resolution only; directories are created by the code that writes into them

mod error;
mod platform;
mod registry;

#[cfg(test)]
mod test_utils;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root};
pub use registry::{registry_dir, registry_dir_in};
