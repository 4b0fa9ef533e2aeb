//! Group-wide signal delivery.
//!
//! Every child is the leader of its own process group, so one `killpg`
//! reaches the child and everything it spawned. Signalling a group that no
//! longer exists is not an error: the work is already done.

use std::io;

use grouprun_core::{KillSignal, ProcessGroup};
use tracing::debug;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

/// Send `signal` to every process in `group`.
///
/// # Returns
/// - `Ok(())` if the signal was delivered or the group is already gone
/// - `Err` for an invalid group id or any other `killpg` failure
pub fn signal_group(group: ProcessGroup, signal: KillSignal) -> io::Result<()> {
    #[cfg(unix)]
    {
        signal_group_unix(group, signal)
    }

    #[cfg(not(unix))]
    {
        let _ = (group, signal);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process groups are not supported on this platform",
        ))
    }
}

/// Ask every process in `group` to stop (`SIGINT`).
pub fn interrupt_group(group: ProcessGroup) -> io::Result<()> {
    signal_group(group, KillSignal::Interrupt)
}

#[cfg(unix)]
fn signal_group_unix(group: ProcessGroup, signal: KillSignal) -> io::Result<()> {
    let pgid = group_pid(group)?;

    match killpg(pgid, to_nix(signal)) {
        Ok(()) => {
            debug!(pgid = %group, %signal, "signalled process group");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            debug!(pgid = %group, %signal, "process group already exited");
            Ok(())
        }
        Err(Errno::EPERM) => {
            // Group leader gone and the id taken by someone we cannot signal
            debug!(pgid = %group, %signal, "permission denied signalling process group");
            Ok(())
        }
        Err(e) => Err(io::Error::other(e)),
    }
}

/// Check whether any process is still in `group`.
#[cfg(unix)]
pub fn group_exists(group: ProcessGroup) -> bool {
    let Ok(pgid) = group_pid(group) else {
        return false;
    };

    match killpg(pgid, None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true, // Exists but we lack permission
    }
}

#[cfg(not(unix))]
pub fn group_exists(_group: ProcessGroup) -> bool {
    false
}

/// Check if a PID exists.
///
/// Uses `kill` with the null signal, which checks existence without
/// delivering anything.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    match signal::kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false, // No such process
        Err(_) => true,             // Process exists but we lack permission
    }
}

#[cfg(not(unix))]
pub fn pid_exists(_pid: u32) -> bool {
    false
}

/// Convert a group to the pid `killpg` expects.
///
/// Group 0 would mean "the caller's own group", so it is rejected along with
/// ids that do not fit a `pid_t`.
#[cfg(unix)]
fn group_pid(group: ProcessGroup) -> io::Result<Pid> {
    match i32::try_from(group.id()) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid process group id {group}"),
        )),
    }
}

#[cfg(unix)]
const fn to_nix(signal: KillSignal) -> Signal {
    match signal {
        KillSignal::Interrupt => Signal::SIGINT,
        KillSignal::Terminate => Signal::SIGTERM,
        KillSignal::Kill => Signal::SIGKILL,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::test_utils::reaped_pid;
    use tokio::process::Command;

    #[test]
    fn pid_exists_for_self() {
        assert!(pid_exists(std::process::id()));
    }

    #[test]
    fn pid_exists_false_for_reaped_child() {
        assert!(!pid_exists(reaped_pid()));
        assert!(!pid_exists(0));
    }

    #[test]
    fn signal_group_handles_already_gone() {
        let result = signal_group(ProcessGroup::new(reaped_pid()), KillSignal::Kill);
        assert!(result.is_ok());
    }

    #[test]
    fn own_group_id_zero_is_rejected() {
        let err = signal_group(ProcessGroup::new(0), KillSignal::Interrupt).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!group_exists(ProcessGroup::new(0)));
    }

    #[tokio::test]
    async fn interrupt_group_stops_group_leader() {
        let mut child = Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .expect("failed to spawn sleep");
        let group = ProcessGroup::new(child.id().expect("no PID"));
        assert!(group_exists(group));

        interrupt_group(group).expect("interrupt failed");
        let status = child.wait().await.expect("wait failed");
        assert!(!status.success());
        assert!(!group_exists(group));
    }
}
