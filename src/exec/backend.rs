//! Execution backends and the availability probe.
//!
//! Two backends exist on every platform. The native backend is the shell
//! the operating system ships with and is assumed to always work. The
//! posix backend is the secondary POSIX environment (WSL on Windows, a
//! plain bash elsewhere) and must be probed before it is trusted.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// A no-op command used to probe whether a backend can run anything at all.
pub(crate) const PROBE_COMMAND: &str = "exit";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Stderr fragments that mean the posix environment itself is absent or
/// broken, as opposed to the user's command failing. Matched case-insensitively.
const ENV_ABSENT_SIGNATURES: &[&str] = &[
    "bash: not found",
    "no installed distributions",
    "wsl is not enabled",
    "wsl.exe was not found",
    "the system cannot find the file specified",
];

/// Spawn-error fragments that mean the backend binary does not exist.
/// Only ever matched against the OS error from a failed spawn, where a
/// user command cannot produce false positives.
const SPAWN_MISSING_SIGNATURES: &[&str] = &[
    "no such file or directory",
    "the system cannot find the file specified",
];

/// Does this stderr output indicate a missing posix environment?
pub(crate) fn stderr_signals_missing_env(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    ENV_ABSENT_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Does this spawn error indicate the backend binary is not installed?
pub(crate) fn spawn_error_signals_missing_env(error: &str) -> bool {
    let lower = error.to_lowercase();
    SPAWN_MISSING_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// A way of turning a command string into a spawnable process.
pub trait CommandBackend: Send + Sync {
    /// Short name used in logs and results.
    fn name(&self) -> &'static str;

    /// Whether commands routed here should first be translated to
    /// PowerShell forms.
    fn translates(&self) -> bool;

    /// Build the process invocation for `command`. Stdio is configured by
    /// the engine, not here.
    fn build(&self, command: &str) -> Command;
}

/// The platform shell: PowerShell on Windows, `sh` elsewhere.
#[derive(Debug, Default)]
pub struct NativeBackend;

impl CommandBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn translates(&self) -> bool {
        cfg!(windows)
    }

    #[cfg(windows)]
    fn build(&self, command: &str) -> Command {
        let mut cmd = Command::new("powershell.exe");
        cmd.arg("-Command").arg(command);
        cmd
    }

    #[cfg(not(windows))]
    fn build(&self, command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// The secondary POSIX environment: `wsl bash` on Windows, `bash` elsewhere.
#[derive(Debug, Default)]
pub struct PosixBackend;

impl CommandBackend for PosixBackend {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn translates(&self) -> bool {
        false
    }

    #[cfg(windows)]
    fn build(&self, command: &str) -> Command {
        let mut cmd = Command::new("wsl");
        cmd.arg("bash").arg("-lc").arg(command);
        cmd
    }

    #[cfg(not(windows))]
    fn build(&self, command: &str) -> Command {
        let mut cmd = Command::new("bash");
        cmd.arg("-lc").arg(command);
        cmd
    }
}

/// Caches the answer to "does the posix backend work here?".
///
/// The probe runs at most once per process. Its result is deliberately
/// never invalidated: installing WSL mid-session requires a restart anyway.
#[derive(Debug, Default)]
pub struct BackendAvailability {
    probed: OnceCell<bool>,
}

impl BackendAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe result if the probe has already run.
    pub fn known(&self) -> Option<bool> {
        self.probed.get().copied()
    }

    /// Whether `backend` can run commands, probing on first call.
    pub async fn check(&self, backend: &dyn CommandBackend) -> bool {
        *self
            .probed
            .get_or_init(|| async {
                let available = probe(backend).await;
                info!(backend = backend.name(), available, "backend probe complete");
                available
            })
            .await
    }
}

async fn probe(backend: &dyn CommandBackend) -> bool {
    let mut cmd = backend.build(PROBE_COMMAND);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let run = async {
        match cmd.output().await {
            Ok(out) => {
                if out.status.success() {
                    return true;
                }
                let stderr = String::from_utf8_lossy(&out.stderr);
                !stderr_signals_missing_env(&stderr) && out.status.code().is_some()
            }
            Err(e) => {
                debug!(backend = backend.name(), error = %e, "backend probe failed to spawn");
                false
            }
        }
    };

    tokio::time::timeout(PROBE_TIMEOUT, run).await.unwrap_or(false)
}
