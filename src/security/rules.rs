//! The ordered risk rule tables.
//!
//! Rules are data, not branching code: each band is a slice of
//! (matcher, reason) records walked in order, and the first match in the
//! highest band wins. Config-supplied patterns (dangerous commands,
//! sensitive paths) are checked by the classifier between the static bands.

/// A command prepared for matching: the raw text, its lowercased form,
/// and the lowercased leading token.
pub(crate) struct Probe<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub token: String,
}

impl<'a> Probe<'a> {
    pub(crate) fn new(command: &'a str) -> Self {
        let lower = command.to_lowercase();
        let token = lower
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            raw: command,
            lower,
            token,
        }
    }
}

/// A predicate over a [`Probe`], expressed as data so rules can be listed
/// and tested independently.
pub(crate) enum Matcher {
    /// Case-insensitive substring over the whole command.
    Contains(&'static str),
    /// Any of the substrings.
    ContainsAny(&'static [&'static str]),
    /// Every sub-matcher must hold.
    All(&'static [Matcher]),
    /// The command contains no path separator at all.
    NoPathSeparator,
}

impl Matcher {
    pub(crate) fn matches(&self, probe: &Probe<'_>) -> bool {
        match self {
            Self::Contains(pat) => probe.lower.contains(pat),
            Self::ContainsAny(pats) => pats.iter().any(|p| probe.lower.contains(p)),
            Self::All(inner) => inner.iter().all(|m| m.matches(probe)),
            Self::NoPathSeparator => !probe.raw.contains('/'),
        }
    }
}

/// One (matcher, reason) record within a band.
pub(crate) struct Rule {
    pub matcher: Matcher,
    pub reason: &'static str,
}

/// Commands that could take the whole system down. Always blocked.
pub(crate) static CRITICAL_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::ContainsAny(&[":(){", ":|:&"]),
        reason: "fork bomb detected - would exhaust system processes",
    },
    Rule {
        matcher: Matcher::ContainsAny(&["rm -rf /", "rm -fr /"]),
        reason: "attempting to delete the root directory",
    },
    Rule {
        matcher: Matcher::ContainsAny(&["mkfs", "format"]),
        reason: "attempting to format a drive",
    },
    Rule {
        matcher: Matcher::ContainsAny(&["dd if=/dev/zero", "dd if=/dev/random"]),
        reason: "attempting to overwrite a drive",
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(&["/boot", "/dev/sda", "/dev/nvme"]),
            Matcher::ContainsAny(&["rm", "dd", ">"]),
        ]),
        reason: "attempting to destroy a boot partition or raw device",
    },
];

/// Very dangerous but not instant-death. Blocked.
///
/// The recursive-delete rule only fires when the command has no `/` at all,
/// so `rm -rf sub/dir` slips past it while `rm -rf foo` does not. That is
/// how the rule has always behaved and callers depend on verdict stability,
/// so it stays until the rule set is versioned.
pub(crate) static HIGH_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(&["rm -rf", "rm -fr"]),
            Matcher::NoPathSeparator,
        ]),
        reason: "recursive delete detected",
    },
    Rule {
        matcher: Matcher::ContainsAny(&["chmod -r", "chown -r"]),
        reason: "recursive permission or ownership change",
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::Contains("kill"),
            Matcher::ContainsAny(&[" 1", "-9 1"]),
        ]),
        reason: "attempting to kill the init process",
    },
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(&["c:\\windows", "c:\\program files"]),
            Matcher::ContainsAny(&["rm", "del"]),
        ]),
        reason: "attempting to delete a protected system directory",
    },
];

/// Could cause problems but won't destroy the machine. Allowed with a warning.
pub(crate) static MEDIUM_RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::All(&[
            Matcher::ContainsAny(&["rm", "del"]),
            Matcher::Contains("*"),
        ]),
        reason: "deleting multiple files with a wildcard",
    },
    Rule {
        matcher: Matcher::ContainsAny(&["chmod", "icacls"]),
        reason: "changing file permissions",
    },
];

/// Leading tokens that are common but inherently risky enough to confirm.
pub(crate) static CONFIRM_TOKENS: &[&str] = &["rm", "del", "kill", "chmod", "chown", "rmdir"];
