//! OS-level runtime for grouprun.
//!
//! Implements the ports declared in `grouprun-core`:
//!
//! - [`Launcher`] starts a [`grouprun_core::ProcessSpec`] in its own process
//!   group, interrupts the whole group on cancellation and reports the exit
//! - [`SearchPathResolver`] resolves executables against `PATH`
//! - [`FileKillRegistry`] keeps pending kill actions on disk so that
//!   [`sweep_orphaned_groups`] (or a [`RegistryWatchdog`]) can deliver them
//!   after the registering process has died

#![deny(unsafe_code)]

mod launcher;
pub mod process;
pub mod registry;
mod resolver;

pub use launcher::Launcher;
pub use process::{TracingSink, interrupt_group, signal_group};
pub use registry::{
    FileKillRegistry, RegistryEntry, RegistryWatchdog, SweepReport, sweep_orphaned_groups,
};
pub use resolver::SearchPathResolver;
