//! Risk classification of command strings.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SafetyConfig;

use super::rules::{CONFIRM_TOKENS, CRITICAL_RULES, HIGH_RULES, MEDIUM_RULES, Probe};
use super::{RiskLevel, Verdict, describe_token};

const CRITICAL_WARNING: &str = "This command could destroy your system!";
const HIGH_WARNING: &str = "This command is very dangerous!";

/// Classifies commands by risk before they reach the execution engine.
///
/// `evaluate` is deterministic and side-effect-free: the same command and
/// configuration always produce the same verdict.
pub struct RiskClassifier {
    config: SafetyConfig,
}

/// A dry run of a command: what the classifier would decide, plus a
/// human-readable description of the leading token. Nothing is executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSimulation {
    pub command: String,
    pub would_execute: bool,
    pub risk_level: RiskLevel,
    pub blocked_reason: Option<String>,
    pub warnings: Vec<String>,
    pub description: String,
}

impl RiskClassifier {
    pub fn new(config: SafetyConfig) -> Self {
        Self { config }
    }

    /// Evaluate a command against the rule bands in fixed priority order:
    /// critical, high, medium, confirmation, safe. The first matching rule
    /// wins and nothing below it is consulted.
    pub fn evaluate(&self, command: &str) -> Verdict {
        if !self.config.enabled {
            return Verdict {
                reason: "safety checks disabled".into(),
                ..Verdict::safe()
            };
        }

        let probe = Probe::new(command);

        for rule in CRITICAL_RULES {
            if rule.matcher.matches(&probe) {
                warn!(command, reason = rule.reason, "blocked critical command");
                return Verdict::blocked(RiskLevel::Critical, rule.reason.into(), CRITICAL_WARNING);
            }
        }
        for pattern in &self.config.dangerous_commands {
            if probe.lower.contains(&pattern.to_lowercase()) {
                warn!(command, pattern, "blocked by configured dangerous pattern");
                return Verdict::blocked(
                    RiskLevel::Critical,
                    format!("matches dangerous pattern: {pattern}"),
                    CRITICAL_WARNING,
                );
            }
        }

        for rule in HIGH_RULES {
            if rule.matcher.matches(&probe) {
                warn!(command, reason = rule.reason, "blocked high-risk command");
                return Verdict::blocked(RiskLevel::High, rule.reason.into(), HIGH_WARNING);
            }
        }

        for rule in MEDIUM_RULES {
            if rule.matcher.matches(&probe) {
                debug!(command, reason = rule.reason, "medium-risk command");
                return Verdict::warned(RiskLevel::Medium, rule.reason.into());
            }
        }
        for path in &self.config.sensitive_paths {
            if probe.lower.contains(&path.to_lowercase()) {
                debug!(command, path, "command touches sensitive path");
                return Verdict::warned(
                    RiskLevel::Medium,
                    format!("accessing sensitive path: {path}"),
                );
            }
        }

        if CONFIRM_TOKENS.contains(&probe.token.as_str()) {
            return Verdict::warned(
                RiskLevel::Low,
                format!("'{}' command requires confirmation", probe.token),
            );
        }

        Verdict::safe()
    }

    /// Describe what a command would do without running it.
    pub fn simulate(&self, command: &str) -> CommandSimulation {
        let verdict = self.evaluate(command);
        let token = command.split_whitespace().next().unwrap_or_default();
        CommandSimulation {
            command: command.to_string(),
            would_execute: verdict.allowed,
            risk_level: verdict.risk_level,
            blocked_reason: (!verdict.allowed).then(|| verdict.reason.clone()),
            warnings: verdict.warnings,
            description: describe_token(token),
        }
    }
}
