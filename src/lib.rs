//! wardshell - an interactive shell with a command safety pipeline
//!
//! Every command typed at the prompt goes through the same pipeline:
//! - `security` classifies the command's risk before anything runs
//! - `exec` translates it for the active backend, spawns it with a bounded
//!   wait, and records the outcome in a session log
//! - `context` persists the raw command history
//! - `suggest` turns natural-language requests into candidate commands,
//!   which re-enter the pipeline like any typed command
//! - `monitor` reports point-in-time resource usage
//!
//! # Example
//!
//! ```no_run
//! use wardshell::config::Config;
//! use wardshell::exec::ExecutionEngine;
//! use wardshell::security::RiskClassifier;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let classifier = RiskClassifier::new(config.safety.clone());
//!     let engine = ExecutionEngine::new(&config.execution);
//!
//!     let verdict = classifier.evaluate("ls -la");
//!     if verdict.allowed {
//!         let result = engine.execute("ls -la").await;
//!         println!("{}", result.output);
//!     } else {
//!         println!("blocked: {}", verdict.reason);
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod exec;
pub mod monitor;
pub mod security;
pub mod suggest;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use context::History;
pub use exec::{ExecutionEngine, ExecutionResult};
pub use security::{RiskClassifier, RiskLevel, Verdict};
pub use suggest::CommandSuggestion;
