//! Command history, persisted across sessions as a plain line-per-command
//! file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct History {
    commands: Vec<String>,
    path: Option<PathBuf>,
    max: usize,
}

impl History {
    /// A history that lives only for this session.
    pub fn in_memory(max: usize) -> Self {
        Self {
            commands: Vec::new(),
            path: None,
            max,
        }
    }

    /// Load history from `path`. A missing file starts an empty history;
    /// an existing file is read line per command, keeping the newest `max`.
    pub fn load(path: PathBuf, max: usize) -> Result<Self> {
        let mut commands = Vec::new();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read history file {}", path.display()))?;
            commands = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            let overflow = commands.len().saturating_sub(max);
            if overflow > 0 {
                commands.drain(..overflow);
            }
            debug!(entries = commands.len(), path = %path.display(), "loaded history");
        }
        Ok(Self {
            commands,
            path: Some(path),
            max,
        })
    }

    /// Record a command. Blank input and immediate repeats of the last
    /// command are skipped; the oldest entry is dropped once full.
    ///
    /// The file is rewritten on every push so a crashed session keeps its
    /// history. A failed write is logged and the in-memory entry kept.
    pub fn push(&mut self, command: &str) {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.commands.last().map(String::as_str) == Some(trimmed) {
            return;
        }
        self.commands.push(trimmed.to_string());
        if self.commands.len() > self.max {
            self.commands.remove(0);
        }
        if let Err(e) = self.save() {
            debug!(error = %e, "failed to persist history");
        }
    }

    /// Write the history back to its file, if it has one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut contents = self.commands.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write history file {}", path.display()))
    }

    /// The most recent `n` commands, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.commands.len().saturating_sub(n);
        &self.commands[start..]
    }

    /// Commands containing `needle`, case-insensitively, oldest first.
    pub fn search(&self, needle: &str) -> Vec<String> {
        let needle = needle.to_lowercase();
        self.commands
            .iter()
            .filter(|cmd| cmd.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Drop all entries, in memory and on disk.
    pub fn clear(&mut self) -> Result<()> {
        self.commands.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
