//! The execution engine: backend selection, spawning, timeouts, fallback,
//! and the session log.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::config::{BackendChoice, ExecutionConfig};
use crate::security::describe_token;

use super::backend::{
    BackendAvailability, CommandBackend, NativeBackend, PosixBackend,
    spawn_error_signals_missing_env, stderr_signals_missing_env,
};
use super::{ExecutionResult, translate};

/// Per-call overrides. Anything left unset falls back to the engine's
/// configured defaults.
#[derive(Debug, Default)]
pub struct ExecOptions {
    pub workdir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub backend: Option<BackendChoice>,
}

/// What a command would do, without running it.
#[derive(Debug, Clone)]
pub struct CommandPreview {
    pub command: String,
    pub description: String,
    /// Whether the command is well-formed enough to hand to a backend.
    pub safe: bool,
}

/// Runs commands through the selected backend and records every outcome.
///
/// `execute` never returns an error: spawn failures, non-zero exits and
/// timeouts all come back as a populated [`ExecutionResult`].
pub struct ExecutionEngine {
    native: Box<dyn CommandBackend>,
    posix: Box<dyn CommandBackend>,
    availability: BackendAvailability,
    default_backend: BackendChoice,
    default_timeout: Duration,
    log: Mutex<Vec<ExecutionResult>>,
}

impl ExecutionEngine {
    pub fn new(config: &ExecutionConfig) -> Self {
        Self::with_backends(config, Box::new(NativeBackend), Box::new(PosixBackend))
    }

    /// Build an engine over explicit backends. The platform constructor is
    /// [`ExecutionEngine::new`]; this one exists for tests and embedders.
    pub fn with_backends(
        config: &ExecutionConfig,
        native: Box<dyn CommandBackend>,
        posix: Box<dyn CommandBackend>,
    ) -> Self {
        Self {
            native,
            posix,
            availability: BackendAvailability::new(),
            default_backend: config.backend,
            default_timeout: Duration::from_secs(config.timeout_secs),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Run `command` with the engine's defaults.
    pub async fn execute(&self, command: &str) -> ExecutionResult {
        self.execute_with(command, ExecOptions::default()).await
    }

    /// Run `command` with per-call overrides.
    pub async fn execute_with(&self, command: &str, opts: ExecOptions) -> ExecutionResult {
        let started = Instant::now();
        let start_time = Local::now();
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let choice = opts.backend.unwrap_or(self.default_backend);

        let use_posix = match choice {
            BackendChoice::Native => false,
            BackendChoice::Posix | BackendChoice::Auto => {
                self.availability.check(self.posix.as_ref()).await
            }
        };
        let backend: &dyn CommandBackend = if use_posix {
            self.posix.as_ref()
        } else {
            self.native.as_ref()
        };

        let mut attempt = run_attempt(backend, command, opts.workdir.as_deref(), timeout).await;

        // The probe can pass and the environment still fall over at run
        // time (WSL distro removed mid-session, say). One retry through the
        // native backend, using the original untranslated command; only the
        // retry's outcome is recorded.
        if use_posix && attempt.signals_missing_env() {
            info!(command, "posix environment failed at run time, retrying natively");
            attempt = run_attempt(self.native.as_ref(), command, opts.workdir.as_deref(), timeout)
                .await;
        }

        let result = ExecutionResult {
            command: command.to_string(),
            success: attempt.exit_code == 0,
            output: attempt.output,
            error: attempt.error,
            exit_code: attempt.exit_code,
            duration: started.elapsed(),
            start_time,
            end_time: Local::now(),
        };
        if let Ok(mut log) = self.log.lock() {
            log.push(result.clone());
        }
        result
    }

    /// Describe `command` without running it.
    pub fn preview(&self, command: &str) -> CommandPreview {
        let (description, safe) = match command.split_whitespace().next() {
            Some(token) => (describe_token(token), true),
            None => ("Empty command".to_string(), false),
        };
        CommandPreview {
            command: command.to_string(),
            description,
            safe,
        }
    }

    /// The most recent `n` results, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ExecutionResult> {
        match self.log.lock() {
            Ok(log) => {
                let skip = log.len().saturating_sub(n);
                log[skip..].to_vec()
            }
            Err(_) => Vec::new(),
        }
    }

    /// How many commands have run this session.
    pub fn log_len(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Cached posix probe result, if the probe has run.
    pub fn posix_available(&self) -> Option<bool> {
        self.availability.known()
    }
}

struct Attempt {
    output: String,
    error: String,
    exit_code: i32,
    timed_out: bool,
    spawn_failed: bool,
}

impl Attempt {
    fn spawn_failure(error: std::io::Error) -> Self {
        Self {
            output: String::new(),
            error: error.to_string(),
            exit_code: -1,
            timed_out: false,
            spawn_failed: true,
        }
    }

    fn signals_missing_env(&self) -> bool {
        if self.spawn_failed {
            return spawn_error_signals_missing_env(&self.error);
        }
        !self.timed_out && self.exit_code != 0 && stderr_signals_missing_env(&self.error)
    }
}

async fn run_attempt(
    backend: &dyn CommandBackend,
    command: &str,
    workdir: Option<&Path>,
    timeout: Duration,
) -> Attempt {
    let prepared = if backend.translates() && translate::is_translatable(command) {
        let translated = translate::translate(command);
        debug!(original = command, translated = %translated, "translated command");
        translated
    } else {
        command.to_string()
    };

    let mut cmd = backend.build(&prepared);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "failed to spawn command");
            return Attempt::spawn_failure(e);
        }
    };

    let out_task = tokio::spawn(slurp(child.stdout.take()));
    let err_task = tokio::spawn(slurp(child.stderr.take()));

    let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => (status.code().unwrap_or(-1), false),
        Ok(Err(e)) => {
            warn!(error = %e, "failed waiting on child");
            (-1, false)
        }
        Err(_) => {
            warn!(command, timeout_secs = timeout.as_secs(), "command timed out, killing");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill timed-out command");
            }
            if let Err(e) = child.wait().await {
                debug!(error = %e, "failed to reap timed-out command");
            }
            (-1, true)
        }
    };

    // Killing the child closes its pipes, so these finish even after a
    // timeout and keep whatever partial output was produced.
    let output = out_task.await.unwrap_or_default();
    let mut error = err_task.await.unwrap_or_default();
    if timed_out {
        if !error.is_empty() && !error.ends_with('\n') {
            error.push('\n');
        }
        error.push_str(&format!("command timed out after {}s", timeout.as_secs()));
    }

    Attempt {
        output,
        error,
        exit_code,
        timed_out,
        spawn_failed: false,
    }
}

async fn slurp<R>(stream: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let Some(mut stream) = stream else {
        return String::new();
    };
    let mut buf = Vec::new();
    if let Err(e) = stream.read_to_end(&mut buf).await {
        debug!(error = %e, "failed reading child stream");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::process::Command;

    fn engine() -> ExecutionEngine {
        ExecutionEngine::new(&ExecutionConfig::default())
    }

    /// Backend whose binary does not exist, so both the probe and any
    /// spawn fail with a missing-file error.
    struct AbsentBackend;

    impl CommandBackend for AbsentBackend {
        fn name(&self) -> &'static str {
            "absent"
        }
        fn translates(&self) -> bool {
            false
        }
        fn build(&self, command: &str) -> Command {
            let mut cmd = Command::new("/nonexistent/posix-env");
            cmd.arg(command);
            cmd
        }
    }

    /// Backend that passes the probe but reports a missing environment for
    /// every real command.
    struct VanishingBackend;

    impl CommandBackend for VanishingBackend {
        fn name(&self) -> &'static str {
            "vanishing"
        }
        fn translates(&self) -> bool {
            false
        }
        fn build(&self, command: &str) -> Command {
            let mut cmd = Command::new("sh");
            if command == super::super::backend::PROBE_COMMAND {
                cmd.arg("-c").arg("exit 0");
            } else {
                cmd.arg("-c").arg("echo 'bash: not found' >&2; exit 127");
            }
            cmd
        }
    }

    #[tokio::test]
    async fn successful_command_is_fully_recorded() {
        let engine = engine();
        let result = engine.execute("echo hello").await;
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.command, "echo hello");
        assert!(result.output.contains("hello"));
        assert!(result.error.is_empty());
        assert!(result.end_time >= result.start_time);
        assert_eq!(engine.log_len(), 1);
    }

    #[tokio::test]
    async fn failing_command_reports_exit_code() {
        let result = engine().execute("exit 3").await;
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[tokio::test]
    async fn stderr_is_captured_separately() {
        let result = engine().execute("echo oops >&2").await;
        assert!(result.output.is_empty());
        assert!(result.error.contains("oops"));
    }

    #[tokio::test]
    async fn timeout_kills_and_keeps_partial_output() {
        let engine = engine();
        let started = Instant::now();
        let result = engine
            .execute_with(
                "echo early; sleep 30",
                ExecOptions {
                    timeout: Some(Duration::from_secs(1)),
                    ..ExecOptions::default()
                },
            )
            .await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!result.success);
        assert_eq!(result.exit_code, -1);
        assert!(result.output.contains("early"));
        assert!(result.error.contains("timed out"));
    }

    #[tokio::test]
    async fn spawn_failure_yields_a_result_not_a_panic() {
        let config = ExecutionConfig {
            backend: BackendChoice::Native,
            ..ExecutionConfig::default()
        };
        let engine =
            ExecutionEngine::with_backends(&config, Box::new(AbsentBackend), Box::new(AbsentBackend));
        let result = engine.execute("echo hi").await;
        assert!(!result.success);
        assert_eq!(result.exit_code, -1);
        assert!(!result.error.is_empty());
        assert_eq!(engine.log_len(), 1);
    }

    #[tokio::test]
    async fn explicit_native_preference_skips_the_probe() {
        let engine = ExecutionEngine::with_backends(
            &ExecutionConfig::default(),
            Box::new(NativeBackend),
            Box::new(AbsentBackend),
        );
        let result = engine
            .execute_with(
                "echo hi",
                ExecOptions {
                    backend: Some(BackendChoice::Native),
                    ..ExecOptions::default()
                },
            )
            .await;
        assert!(result.success);
        assert!(engine.posix_available().is_none());
    }

    #[tokio::test]
    async fn auto_demotes_to_native_when_probe_fails() {
        let engine = ExecutionEngine::with_backends(
            &ExecutionConfig::default(),
            Box::new(NativeBackend),
            Box::new(AbsentBackend),
        );
        let result = engine.execute("echo hi").await;
        assert!(result.success);
        assert!(result.output.contains("hi"));
        assert_eq!(engine.posix_available(), Some(false));
    }

    #[tokio::test]
    async fn runtime_environment_loss_falls_back_to_native() {
        let engine = ExecutionEngine::with_backends(
            &ExecutionConfig::default(),
            Box::new(NativeBackend),
            Box::new(VanishingBackend),
        );
        let result = engine
            .execute_with(
                "echo recovered",
                ExecOptions {
                    backend: Some(BackendChoice::Posix),
                    ..ExecOptions::default()
                },
            )
            .await;
        assert!(result.success, "fallback should succeed: {:?}", result.error);
        assert!(result.output.contains("recovered"));
        assert_eq!(result.command, "echo recovered");
        // Only the retry is recorded, not the failed first attempt.
        assert_eq!(engine.log_len(), 1);
        assert!(engine.recent(1)[0].success);
    }

    #[tokio::test]
    async fn workdir_override_applies() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let result = engine()
            .execute_with(
                "pwd",
                ExecOptions {
                    workdir: Some(dir.path().to_path_buf()),
                    ..ExecOptions::default()
                },
            )
            .await;
        assert!(result.success);
        let canonical = dir
            .path()
            .canonicalize()
            .unwrap_or_else(|e| panic!("canonicalize: {e}"));
        assert!(result.output.contains(&canonical.display().to_string()));
    }

    #[tokio::test]
    async fn recent_returns_newest_results() {
        let engine = engine();
        engine.execute("echo one").await;
        engine.execute("echo two").await;
        engine.execute("echo three").await;
        let recent = engine.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].command, "echo two");
        assert_eq!(recent[1].command, "echo three");
        assert_eq!(engine.recent(10).len(), 3);
    }

    #[test]
    fn preview_describes_without_running() {
        let engine = engine();
        let preview = engine.preview("ls -la");
        assert_eq!(preview.description, "Lists files and directories");
        assert!(preview.safe);
        assert_eq!(engine.log_len(), 0);

        let preview = engine.preview("");
        assert_eq!(preview.description, "Empty command");
        assert!(!preview.safe);

        let preview = engine.preview("   ");
        assert!(!preview.safe);
    }
}
