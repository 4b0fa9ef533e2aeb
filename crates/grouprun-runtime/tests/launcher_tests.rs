//! End-to-end tests for `Launcher::run` against real processes.
//!
//! Tests that read or modify the process environment hold `ENV_LOCK`, since
//! the test harness runs them on parallel threads of one process.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use grouprun_core::{CaptureBuffer, NoopKillRegistrar, ProcessSpec, ResolveError, RunError};
use grouprun_core::KillSignal;
use grouprun_runtime::process::group_exists;
use grouprun_runtime::registry::list_entries;
use grouprun_runtime::{FileKillRegistry, Launcher, signal_group};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard that restores an environment variable to its original value on drop.
struct EnvVarGuard {
    key: &'static str,
    previous: Option<OsString>,
}

impl EnvVarGuard {
    #[allow(unsafe_code)]
    fn set(key: &'static str, value: &str) -> Self {
        let previous = env::var_os(key);
        unsafe {
            env::set_var(key, value);
        }
        Self { key, previous }
    }
}

impl Drop for EnvVarGuard {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { env::set_var(self.key, value) },
            None => unsafe { env::remove_var(self.key) },
        }
    }
}

fn launcher() -> Launcher {
    Launcher::with_registrar(Arc::new(NoopKillRegistrar))
}

async fn run_capturing(spec: ProcessSpec) -> (Result<(), RunError>, String) {
    let stdout = CaptureBuffer::new();
    let spec = spec.with_stdout(stdout.clone());
    let result = launcher().run(&spec, &CancellationToken::new()).await;
    (result, stdout.to_string_lossy())
}

#[tokio::test]
async fn test_command() {
    let (result, stdout) = run_capturing(ProcessSpec::command("echo", ["Hello, World!"])).await;
    assert_ok!(result);
    assert_eq!(stdout, "Hello, World!\n");
}

#[tokio::test]
async fn test_process_env() {
    let spec = ProcessSpec::command("sh", ["-c", r#"echo "$MY_VAR""#])
        .with_name("env-test")
        .with_env("MY_VAR", "hello-from-env");

    let (result, stdout) = run_capturing(spec).await;
    result.expect("sh failed");
    assert_eq!(stdout, "hello-from-env\n");
}

#[tokio::test]
async fn test_process_inherit_os_env() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let _env = EnvVarGuard::set("RUN_TEST_INHERIT", "inherited-value");

    let spec = ProcessSpec::command("sh", ["-c", r#"echo "$RUN_TEST_INHERIT""#])
        .with_name("inherit-test")
        .inherit_os_env(true);

    let (result, stdout) = run_capturing(spec).await;
    result.expect("sh failed");
    assert_eq!(stdout, "inherited-value\n");
}

#[tokio::test]
async fn test_process_env_overrides_inherited() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let _env = EnvVarGuard::set("RUN_TEST_OVERRIDE", "original");

    let spec = ProcessSpec::command("sh", ["-c", r#"echo "$RUN_TEST_OVERRIDE""#])
        .with_name("override-test")
        .inherit_os_env(true)
        .with_env("RUN_TEST_OVERRIDE", "replaced");

    let (result, stdout) = run_capturing(spec).await;
    result.expect("sh failed");
    assert_eq!(stdout, "replaced\n");
}

#[tokio::test]
async fn explicit_env_without_inherit_hides_parent_variables() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let _env = EnvVarGuard::set("RUN_TEST_HIDDEN", "should-not-leak");

    let spec = ProcessSpec::command("sh", ["-c", r#"echo "[$RUN_TEST_HIDDEN][$MY_VAR]""#])
        .with_env("MY_VAR", "visible");

    let (result, stdout) = run_capturing(spec).await;
    result.expect("sh failed");
    assert_eq!(stdout, "[][visible]\n");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn default_environment_is_parent_environment() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

    // `env -0` separates entries with NUL, so multi-line values survive
    let (result, stdout) = run_capturing(ProcessSpec::command("env", ["-0"])).await;
    result.expect("env failed");

    let child: BTreeMap<String, String> = stdout
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let parent: BTreeMap<String, String> = env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
        .collect();

    assert_eq!(child, parent);
}

#[tokio::test]
async fn arguments_are_passed_in_order() {
    let spec = ProcessSpec::command("sh", ["-c", r#"printf '%s|' "$@""#, "sh"])
        .with_args(["one", "two words", "three"]);

    let (result, stdout) = run_capturing(spec).await;
    result.expect("sh failed");
    assert_eq!(stdout, "one|two words|three|");
}

#[tokio::test]
async fn working_directory_is_applied() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().canonicalize().unwrap();
    let spec = ProcessSpec::command("pwd", ["-P"]).with_working_dir(dir.path());

    let (result, stdout) = run_capturing(spec).await;
    result.expect("pwd failed");
    assert_eq!(stdout.trim_end(), expected.to_string_lossy());
}

#[tokio::test]
async fn stderr_is_captured_separately() {
    let stdout = CaptureBuffer::new();
    let stderr = CaptureBuffer::new();
    let spec = ProcessSpec::command("sh", ["-c", "echo out; echo err >&2"])
        .with_stdout(stdout.clone())
        .with_stderr(stderr.clone());

    launcher()
        .run(&spec, &CancellationToken::new())
        .await
        .expect("sh failed");

    assert_eq!(stdout.to_string_lossy(), "out\n");
    assert_eq!(stderr.to_string_lossy(), "err\n");
}

#[tokio::test]
async fn non_zero_exit_is_exit_error() {
    let (result, _) = run_capturing(ProcessSpec::command("sh", ["-c", "exit 3"])).await;
    let err = assert_err!(result);
    assert!(matches!(err, RunError::Exit { code: 3 }));
    assert!(err.is_child_failure());
}

#[tokio::test]
async fn missing_executable_fails_before_start() {
    let dir = TempDir::new().unwrap();
    let registry = FileKillRegistry::new(dir.path());
    let launcher = Launcher::with_registrar(Arc::new(registry));

    let spec = ProcessSpec::command("grouprun-no-such-program-12345", Vec::<String>::new());
    let err = launcher
        .run(&spec, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::NotFound(ResolveError::NotFound { .. })));
    // No registration side effect: the registry was never even created
    assert!(list_entries(dir.path()).unwrap().is_empty());
}

#[tokio::test]
async fn spec_is_reusable_across_runs() {
    let stdout = CaptureBuffer::new();
    let spec = ProcessSpec::command("echo", ["again"]).with_stdout(stdout.clone());
    let launcher = launcher();

    launcher.run(&spec, &CancellationToken::new()).await.unwrap();
    launcher.run(&spec, &CancellationToken::new()).await.unwrap();

    assert_eq!(stdout.to_string_lossy(), "again\nagain\n");
    assert_eq!(spec.args, vec!["again".to_string()]);
}

#[tokio::test]
async fn registry_entry_lives_exactly_as_long_as_the_child() {
    let dir = TempDir::new().unwrap();
    let registry = FileKillRegistry::new(dir.path());
    let launcher = Launcher::with_registrar(Arc::new(registry.clone()));

    let cancel = CancellationToken::new();
    let run = {
        let cancel = cancel.clone();
        let spec = ProcessSpec::command("sleep", ["30"]);
        tokio::spawn(async move { launcher.run(&spec, &cancel).await })
    };

    let entry = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(entry) = registry.pending().unwrap().into_iter().next() {
                return entry;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("kill action was never registered");
    assert_eq!(entry.label, "sleep");
    assert_eq!(entry.owner_pid, std::process::id());

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run did not return after cancellation")
        .expect("run task panicked");

    assert!(matches!(result, Err(RunError::Signaled { signal: 2 })));
    assert!(registry.pending().unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_reaches_grandchildren() {
    let stdout = CaptureBuffer::new();
    // The trapping shell is a grandchild: the outer shell runs it in the foreground
    let inner = r#"trap 'echo grandchild-interrupted; exit 0' INT; echo ready; while :; do sleep 0.05; done"#;
    let spec = ProcessSpec::command("sh", ["-c", &format!("sh -c \"{inner}\"; true")])
        .with_stdout(stdout.clone());

    let cancel = CancellationToken::new();
    let run = {
        let cancel = cancel.clone();
        let launcher = launcher();
        tokio::spawn(async move { launcher.run(&spec, &cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while !stdout.to_string_lossy().contains("ready") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("grandchild never became ready");
    cancel.cancel();

    let _ = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run did not return after cancellation")
        .expect("run task panicked");

    assert!(stdout.to_string_lossy().contains("grandchild-interrupted"));
}

#[tokio::test]
async fn abandoned_run_interrupts_group_and_keeps_registration() {
    let dir = TempDir::new().unwrap();
    let registry = FileKillRegistry::new(dir.path());
    let launcher = Launcher::with_registrar(Arc::new(registry.clone()));

    let stdout = CaptureBuffer::new();
    // Survives SIGINT, so only the registered SIGKILL can end it
    let script = r#"trap 'echo interrupted' INT; echo ready; while :; do sleep 0.05; done"#;
    let spec = ProcessSpec::command("sh", ["-c", script]).with_stdout(stdout.clone());

    let cancel = CancellationToken::new();
    tokio::select! {
        result = launcher.run(&spec, &cancel) => panic!("run finished on its own: {result:?}"),
        () = wait_for_output(&stdout, "ready") => {}
    }
    // The run future is gone; the child is not

    wait_for_output(&stdout, "interrupted").await;

    let pending = registry.pending().unwrap();
    assert_eq!(pending.len(), 1, "abandoned run must keep its kill registration");
    let entry = &pending[0];
    assert_eq!(entry.signal, KillSignal::Kill);
    assert!(group_exists(entry.target));

    signal_group(entry.target, KillSignal::Kill).unwrap();
}

async fn wait_for_output(buffer: &CaptureBuffer, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.to_string_lossy().contains(needle) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("output never contained {needle:?}"));
}
