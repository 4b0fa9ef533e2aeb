//! Process-level plumbing shared by the launcher and the registry.
//!
//! - `signal`: group-wide signal delivery and liveness checks
//! - `stream`: copying child output into sinks and feeding stdin
//! - `exit`: mapping an `ExitStatus` onto `RunError`

mod exit;
pub mod signal;
mod stream;

pub(crate) use exit::exit_status_result;
pub use signal::{group_exists, interrupt_group, pid_exists, signal_group};
pub(crate) use stream::{
    StreamTasks, spawn_input_feeder, spawn_output_copier, spawn_reader_feeder,
};
pub use stream::TracingSink;

#[cfg(all(test, unix))]
pub(crate) mod test_utils {
    /// Pid of a child that has already exited and been reaped.
    pub(crate) fn reaped_pid() -> u32 {
        let mut child = std::process::Command::new("true")
            .spawn()
            .expect("failed to spawn true");
        let pid = child.id();
        child.wait().expect("failed to reap true");
        pid
    }
}
