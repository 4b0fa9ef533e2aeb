//! Process launcher.
//!
//! Runs one [`ProcessSpec`] to completion:
//!
//! 1. Resolve the executable (nothing is started on failure)
//! 2. Start the child as the leader of a new process group
//! 3. Register a `SIGKILL` for that group with the crash-safety registrar
//! 4. Wait for exit; on cancellation interrupt the whole group and keep waiting
//! 5. Release the registration and report the exit status
//!
//! Cancellation is cooperative: `run` returns only once the child has
//! actually exited, so its return means the process is gone. Dropping the
//! `run` future early interrupts the group but keeps the registration, so the
//! recorded `SIGKILL` is still delivered once this process is gone.

use std::env;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use grouprun_core::{
    ExecutableResolver, InputSource, KillRegistrar, KillSignal, OutputTarget, ProcessGroup,
    ProcessSpec, RegistrarError, Registration, RunError, effective_environment,
};
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::process::{
    StreamTasks, exit_status_result, interrupt_group, spawn_input_feeder, spawn_output_copier,
    spawn_reader_feeder,
};
use crate::registry::FileKillRegistry;
use crate::resolver::SearchPathResolver;

/// Launches process specs with group-wide cancellation and crash safety.
///
/// A launcher holds no per-run state; one instance can drive any number of
/// concurrent runs.
#[derive(Clone)]
pub struct Launcher {
    resolver: Arc<dyn ExecutableResolver>,
    registrar: Arc<dyn KillRegistrar>,
}

impl Launcher {
    /// Create a launcher from explicit collaborators.
    pub fn new(resolver: Arc<dyn ExecutableResolver>, registrar: Arc<dyn KillRegistrar>) -> Self {
        Self {
            resolver,
            registrar,
        }
    }

    /// Create a launcher resolving against `PATH` with the given registrar.
    pub fn with_registrar(registrar: Arc<dyn KillRegistrar>) -> Self {
        Self::new(Arc::new(SearchPathResolver), registrar)
    }

    /// Create a launcher resolving against `PATH` and registering kill actions
    /// in the default registry directory.
    pub fn with_defaults() -> Result<Self, RegistrarError> {
        Ok(Self::with_registrar(Arc::new(
            FileKillRegistry::open_default()?,
        )))
    }

    /// Run `spec` until the child exits.
    ///
    /// Cancelling `cancel` sends `SIGINT` to the child's process group; the
    /// call still waits for the child to exit. A token that is already
    /// cancelled aborts before anything is resolved or started.
    pub async fn run(&self, spec: &ProcessSpec, cancel: &CancellationToken) -> Result<(), RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        let path = self.resolver.resolve(&spec.path)?;
        debug!(name = %spec.name, path = %path.display(), "Resolved executable");

        // Taken before spawning so concurrent runs of one spec agree on who reads it
        let stdin_reader = match &spec.stdin {
            InputSource::Reader(reader) => reader.take(),
            _ => None,
        };

        let mut command = build_command(&path, spec, stdin_reader.is_some())?;
        let mut child = command.spawn().map_err(|source| RunError::Start {
            path: path.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| RunError::Start {
            path: path.clone(),
            source: io::Error::other("spawned child has no PID"),
        })?;
        let group = ProcessGroup::new(pid);
        debug!(name = %spec.name, pid, pgid = %group, "Started process");

        let registration = match self.registrar.register(&spec.name, group, KillSignal::Kill) {
            Ok(registration) => registration,
            Err(e) => {
                warn!(name = %spec.name, pgid = %group, error = %e, "Failed to register killer, interrupting process group");
                if let Err(signal_err) = interrupt_group(group) {
                    warn!(pgid = %group, error = %signal_err, "Failed to interrupt process group");
                }
                return Err(RunError::Registration(e));
            }
        };

        // Until the child is observed exiting, dropping this future must not
        // leave the group running unattended.
        let abandon_guard = AbandonGuard::new(group, registration);
        let streams = wire_streams(&mut child, spec, stdin_reader);

        let status = wait_or_interrupt(&mut child, group, &spec.name, cancel).await;
        let registration = abandon_guard.finish();

        match &status {
            Ok(_) => streams.join().await,
            Err(_) => streams.abort(),
        }

        if let Some(registration) = registration
            && let Err(e) = registration.release()
        {
            warn!(name = %spec.name, pgid = %group, error = %e, "Failed to release kill registration");
        }

        let status = status.map_err(RunError::Wait)?;
        debug!(name = %spec.name, pid, %status, "Process exited");
        exit_status_result(status)
    }
}

/// Wait for the child, interrupting its group if `cancel` fires first.
///
/// Both paths end in the same `wait`, so the caller observes exactly one
/// exit regardless of which side of the race won.
async fn wait_or_interrupt(
    child: &mut Child,
    group: ProcessGroup,
    name: &str,
    cancel: &CancellationToken,
) -> io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => status,
        () = cancel.cancelled() => {
            debug!(%name, pgid = %group, "Cancellation requested, interrupting process group");
            if let Err(e) = interrupt_group(group) {
                warn!(%name, pgid = %group, error = %e, "Failed to interrupt process group");
            }
            child.wait().await
        }
    }
}

fn build_command(
    path: &Path,
    spec: &ProcessSpec,
    has_stdin_reader: bool,
) -> Result<Command, RunError> {
    let mut command = Command::new(path);
    command.args(&spec.args);

    if let Some(dir) = &spec.working_dir {
        command.current_dir(dir);
    }

    // Read at run time so later changes to the parent environment are seen
    if let Some(environment) = effective_environment(spec, env::vars_os()) {
        command.env_clear();
        command.envs(environment);
    }

    command.stdin(input_stdio(&spec.stdin, has_stdin_reader)?);
    command.stdout(output_stdio(&spec.stdout));
    command.stderr(output_stdio(&spec.stderr));

    // New group with pgid == pid, so the group id is known as soon as the pid is
    #[cfg(unix)]
    command.process_group(0);

    Ok(command)
}

fn input_stdio(source: &InputSource, has_reader: bool) -> Result<Stdio, RunError> {
    match source {
        InputSource::Inherit => Ok(Stdio::inherit()),
        InputSource::Null => Ok(Stdio::null()),
        InputSource::Bytes(_) => Ok(Stdio::piped()),
        // A reader already drained by an earlier run leaves nothing to feed
        InputSource::Reader(_) if has_reader => Ok(Stdio::piped()),
        InputSource::Reader(_) => Ok(Stdio::null()),
        InputSource::File(path) => std::fs::File::open(path)
            .map(Stdio::from)
            .map_err(|source| RunError::Stream {
                stream: "stdin",
                path: path.clone(),
                source,
            }),
    }
}

fn output_stdio(target: &OutputTarget) -> Stdio {
    match target {
        OutputTarget::Inherit => Stdio::inherit(),
        OutputTarget::Null => Stdio::null(),
        OutputTarget::Sink(_) => Stdio::piped(),
    }
}

/// Start the copy tasks for every piped stream of `child`.
fn wire_streams(
    child: &mut Child,
    spec: &ProcessSpec,
    stdin_reader: Option<Box<dyn AsyncRead + Send + Unpin>>,
) -> StreamTasks {
    let mut tasks = StreamTasks::default();

    if let Some(stdin) = child.stdin.take() {
        match (&spec.stdin, stdin_reader) {
            (_, Some(reader)) => {
                tasks.push_input(spawn_reader_feeder(stdin, reader, spec.name.clone()));
            }
            (InputSource::Bytes(data), None) => {
                tasks.push_input(spawn_input_feeder(stdin, Arc::clone(data), spec.name.clone()));
            }
            _ => {}
        }
    }

    if let OutputTarget::Sink(sink) = &spec.stdout
        && let Some(stdout) = child.stdout.take()
    {
        tasks.push_output(spawn_output_copier(
            stdout,
            Arc::clone(sink),
            spec.name.clone(),
            "stdout",
        ));
    }

    if let OutputTarget::Sink(sink) = &spec.stderr
        && let Some(stderr) = child.stderr.take()
    {
        tasks.push_output(spawn_output_copier(
            stderr,
            Arc::clone(sink),
            spec.name.clone(),
            "stderr",
        ));
    }

    tasks
}

/// Holds the registration while the child is running.
///
/// Dropped before [`AbandonGuard::finish`], the run was abandoned with the
/// child possibly still alive: the group gets `SIGINT` and the registration
/// is persisted, so the recorded kill still fires once this process is gone.
struct AbandonGuard {
    group: ProcessGroup,
    registration: Option<Registration>,
}

impl AbandonGuard {
    fn new(group: ProcessGroup, registration: Registration) -> Self {
        Self {
            group,
            registration: Some(registration),
        }
    }

    /// The child was reaped (or reaping failed); hand the registration back.
    fn finish(mut self) -> Option<Registration> {
        self.registration.take()
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            debug!(pgid = %self.group, "Run abandoned before exit, interrupting process group");
            let _ = interrupt_group(self.group);
            registration.persist();
        }
    }
}
