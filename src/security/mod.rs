//! Security module: command risk classification.
//!
//! Commands are classified before anything is executed. The classifier is a
//! pure function of the command string and the safety configuration; the
//! only bypass is disabling it in the config.

mod classifier;
mod rules;

pub use classifier::{CommandSimulation, RiskClassifier};

use serde::{Deserialize, Serialize};

/// How dangerous a command is. Ordered from harmless to always-blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High and Critical commands are never executed.
    pub fn blocks(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// The classifier's decision for one command. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    pub risk_level: RiskLevel,
    /// Why the command was blocked; empty for allowed commands.
    pub reason: String,
    /// Advisory messages shown alongside allowed-but-risky commands.
    pub warnings: Vec<String>,
}

impl Verdict {
    pub(crate) fn safe() -> Self {
        Self {
            allowed: true,
            risk_level: RiskLevel::Safe,
            reason: String::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn blocked(level: RiskLevel, reason: String, warning: &str) -> Self {
        Self {
            allowed: false,
            risk_level: level,
            reason,
            warnings: vec![warning.to_string()],
        }
    }

    pub(crate) fn warned(level: RiskLevel, warning: String) -> Self {
        Self {
            allowed: true,
            risk_level: level,
            reason: String::new(),
            warnings: vec![warning],
        }
    }
}

/// One-line descriptions for well-known leading tokens, shared by
/// `RiskClassifier::simulate` and `ExecutionEngine::preview`.
pub fn describe_token(token: &str) -> String {
    let token = token.to_lowercase();
    let known = match token.as_str() {
        "ls" => "Lists files and directories",
        "pwd" => "Shows the current directory path",
        "cat" => "Displays file contents",
        "head" => "Shows the first lines of a file",
        "tail" => "Shows the last lines of a file",
        "touch" => "Creates a new empty file",
        "mkdir" => "Creates a new directory",
        "rm" => "Removes files or directories",
        "del" => "Deletes files",
        "rmdir" => "Removes a directory",
        "cp" => "Copies files or directories",
        "mv" => "Moves or renames files",
        "echo" => "Prints text to the screen",
        "clear" => "Clears the screen",
        "ps" => "Shows running processes",
        "kill" => "Terminates a running process",
        "grep" => "Searches for text in files",
        "find" => "Finds files and directories",
        "df" => "Shows disk space usage",
        "whoami" => "Shows the current username",
        "hostname" => "Shows the computer name",
        "date" => "Shows the current date and time",
        "wc" => "Counts lines, words, and characters in a file",
        "chmod" => "Changes file permissions",
        "chown" => "Changes file ownership",
        "mkfs" => "Creates a new filesystem (formats a drive)",
        "dd" => "Copies data at a low level",
        "format" => "Formats a drive",
        _ => return format!("Executes the '{token}' command"),
    };
    known.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_ordering() {
        assert!(RiskLevel::Safe < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn blocking_levels() {
        assert!(RiskLevel::Critical.blocks());
        assert!(RiskLevel::High.blocks());
        assert!(!RiskLevel::Medium.blocks());
        assert!(!RiskLevel::Low.blocks());
        assert!(!RiskLevel::Safe.blocks());
    }

    #[test]
    fn describe_known_and_unknown_tokens() {
        assert_eq!(describe_token("ls"), "Lists files and directories");
        assert_eq!(describe_token("LS"), "Lists files and directories");
        assert_eq!(
            describe_token("frobnicate"),
            "Executes the 'frobnicate' command"
        );
    }
}
