//! Exit status translation.

use std::process::ExitStatus;

use grouprun_core::RunError;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

/// Map a reaped child's status onto the run result.
pub(crate) fn exit_status_result(status: ExitStatus) -> Result<(), RunError> {
    if status.success() {
        return Ok(());
    }

    if let Some(code) = status.code() {
        return Err(RunError::Exit { code });
    }

    #[cfg(unix)]
    if let Some(signal) = status.signal() {
        return Err(RunError::Signaled { signal });
    }

    Err(RunError::Exit { code: -1 })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert!(exit_status_result(ExitStatus::from_raw(0)).is_ok());
    }

    #[test]
    fn non_zero_code_is_exit_error() {
        // Raw wait status: exit code lives in the second byte
        let err = exit_status_result(ExitStatus::from_raw(3 << 8)).unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn signal_termination_is_reported() {
        let err = exit_status_result(ExitStatus::from_raw(2)).unwrap_err();
        assert!(matches!(err, RunError::Signaled { signal: 2 }));
    }
}
