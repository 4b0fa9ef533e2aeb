//! Recovery of kill actions left behind by dead owners.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use super::io::{delete_entry, list_entries};
use crate::process::{group_exists, pid_exists, signal_group};

/// Outcome of one sweep over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Orphaned groups that were sent their recorded signal.
    pub signalled: usize,
    /// Entries deleted because their owner is gone.
    pub removed: usize,
    /// Entries left alone because their owner is still alive.
    pub skipped: usize,
}

impl SweepReport {
    /// Whether the sweep changed anything.
    pub const fn is_empty(&self) -> bool {
        self.signalled == 0 && self.removed == 0
    }
}

impl std::ops::AddAssign for SweepReport {
    fn add_assign(&mut self, rhs: Self) {
        self.signalled += rhs.signalled;
        self.removed += rhs.removed;
        self.skipped += rhs.skipped;
    }
}

/// Deliver pending kill actions whose owner has died.
///
/// # Strategy
/// 1. Read all entries from `dir`
/// 2. For each entry:
///    - Owner still alive: skip, it will release the entry itself
///    - Owner gone, target group still present: send the recorded signal
///    - Owner gone: delete the entry
/// 3. Log results
///
/// A group that cannot be signalled is logged and its entry removed anyway;
/// there is exactly one forced-kill attempt per entry.
pub fn sweep_orphaned_groups(dir: &Path) -> io::Result<SweepReport> {
    let entries = list_entries(dir)?;
    let mut report = SweepReport::default();

    if entries.is_empty() {
        debug!("No pending kill actions found");
        return Ok(report);
    }

    let own_group = current_group();

    for (path, entry) in entries {
        if pid_exists(entry.owner_pid) {
            report.skipped += 1;
            continue;
        }

        if Some(entry.target.id()) == own_group {
            // Never signal the group this sweep is running in
            warn!(pgid = %entry.target, name = %entry.label, "kill action targets our own process group, dropping it");
        } else if group_exists(entry.target) {
            debug!(
                pgid = %entry.target,
                owner = entry.owner_pid,
                signal = %entry.signal,
                name = %entry.label,
                "Delivering orphaned kill action"
            );
            match signal_group(entry.target, entry.signal) {
                Ok(()) => report.signalled += 1,
                Err(e) => warn!(
                    pgid = %entry.target,
                    name = %entry.label,
                    error = %e,
                    "Failed to signal orphaned process group"
                ),
            }
        } else {
            debug!(pgid = %entry.target, name = %entry.label, "Orphaned process group already gone");
        }

        delete_entry(&path)?;
        report.removed += 1;
    }

    if !report.is_empty() {
        info!(
            "Orphan sweep complete: {} groups signalled, {} entries removed, {} still owned",
            report.signalled, report.removed, report.skipped
        );
    }

    Ok(report)
}

#[cfg(unix)]
fn current_group() -> Option<u32> {
    u32::try_from(nix::unistd::getpgrp().as_raw()).ok()
}

#[cfg(not(unix))]
const fn current_group() -> Option<u32> {
    None
}
