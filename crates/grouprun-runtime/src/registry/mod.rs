//! Durable kill registry for crash safety.
//!
//! A launcher registers "kill this process group if I die" right after
//! starting a child and removes the entry once the child is reaped. Entries
//! live on disk, so they outlive a parent that is killed with an
//! uncatchable signal; the sweep delivers them afterwards.
//!
//! # Safety guarantees
//! - Atomic writes via temp file + rename
//! - One uniquely named file per registration (no shared mutable state)
//! - Entries owned by a live process are never touched by the sweep

mod file;
mod io;
mod sweep;
mod watchdog;

pub use file::FileKillRegistry;
pub use io::{RegistryEntry, delete_entry, list_entries, read_entry, write_entry};
pub use sweep::{SweepReport, sweep_orphaned_groups};
pub use watchdog::RegistryWatchdog;
