//! Command execution: backend-aware translation, bounded-wait spawning,
//! and the session execution log.

mod backend;
mod engine;
pub mod translate;

pub use backend::{BackendAvailability, CommandBackend, NativeBackend, PosixBackend};
pub use engine::{CommandPreview, ExecOptions, ExecutionEngine};

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// The recorded outcome of one `execute()` call.
///
/// Always fully populated: spawn failures and timeouts produce a result
/// just like clean exits do.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// The command as the caller supplied it, before any translation.
    pub command: String,
    pub output: String,
    pub error: String,
    pub exit_code: i32,
    pub success: bool,
    #[serde(serialize_with = "duration_as_secs")]
    pub duration: Duration,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl ExecutionResult {
    /// Wall-clock duration in seconds, for display and history consumers.
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

fn duration_as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
