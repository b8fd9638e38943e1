//! Shared helpers: logging setup and path resolution.

mod logger;

pub use logger::init_logging;

use std::path::PathBuf;

/// Resolve a file name relative to the user's home directory, falling back
/// to the current directory when no home is set.
pub fn home_file(name: &str) -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}
