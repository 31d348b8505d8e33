//! Exit-code classification for maintenance commands.
//!
//! Each maintenance command owns a static table mapping its documented exit
//! codes to an outcome, a severity, and a message template. One `classify`
//! primitive consumes the tables, so every call site categorizes the same
//! code the same way. Message wording follows dnf(8); it is a stable surface
//! for log consumers.

use crate::invoke::ProcessResult;
use crate::logsink::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of maintenance outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The operation completed as intended.
    Success,
    /// The tool reported an error it handled itself (exit 1).
    HandledError,
    /// An unhandled tool error (exit 3), or a stage fault such as a failed
    /// spawn or a filesystem error.
    UnknownError,
    /// Problem acquiring or releasing the package manager lock (exit 200).
    LockContention,
    /// check-update's designed-for non-zero exit: updates exist (exit 100).
    UpdatesAvailable,
    /// The invocation timeout budget expired.
    TimedOut,
    /// An exit code outside the documented contract. Signal deaths surface
    /// here as code -1.
    UnexpectedCode(i32),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::HandledError => "handled error",
            Self::UnknownError => "unknown error",
            Self::LockContention => "lock contention",
            Self::UpdatesAvailable => "updates available",
            Self::TimedOut => "timed out",
            Self::UnexpectedCode(_) => "unexpected code",
        }
    }

    /// Success also covers the designed-for "updates exist" exit.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::UpdatesAvailable)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCode(code) => write!(f, "unexpected code {}", code),
            other => f.write_str(other.label()),
        }
    }
}

/// Classified result of one maintenance stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Stage name: "clean", "evict-cache" or "check-updates".
    pub step: String,
    pub outcome: Outcome,
    pub severity: Severity,
    /// Human-readable line; wording is stable per exit code.
    pub message: String,
    /// The raw invocation, present only when a process actually ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<ProcessResult>,
}

/// Maintenance commands with a classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintCommand {
    /// `dnf clean all`
    CleanAll,
    /// `dnf check-update`
    CheckUpdate,
}

impl MaintCommand {
    /// Subcommand arguments appended to the configured program.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::CleanAll => &["clean", "all"],
            Self::CheckUpdate => &["check-update"],
        }
    }

    /// Pipeline stage name.
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::CleanAll => "clean",
            Self::CheckUpdate => "check-updates",
        }
    }

    fn rules(&self) -> &'static [CodeRule] {
        match self {
            Self::CleanAll => CLEAN_RULES,
            Self::CheckUpdate => CHECK_UPDATE_RULES,
        }
    }
}

/// One row of a command's exit-code table. Templates expand `{code}`,
/// `{stdout}` and `{stderr}` from the raw result.
struct CodeRule {
    code: i32,
    outcome: Outcome,
    severity: Severity,
    template: &'static str,
}

/// dnf(8) return codes for `clean all`.
const CLEAN_RULES: &[CodeRule] = &[
    CodeRule {
        code: 0,
        outcome: Outcome::Success,
        severity: Severity::Info,
        template: "Operation was successful.",
    },
    CodeRule {
        code: 1,
        outcome: Outcome::HandledError,
        severity: Severity::Error,
        template: "An error occurred, which was handled by dnf: {stderr}",
    },
    CodeRule {
        code: 3,
        outcome: Outcome::UnknownError,
        severity: Severity::Critical,
        template: "An unknown unhandled error occurred during operation: {stderr}",
    },
    CodeRule {
        code: 200,
        outcome: Outcome::LockContention,
        severity: Severity::Warning,
        template: "There was a problem with acquiring or releasing of locks: {stderr}",
    },
];

/// dnf(8) return codes for `check-update`. 100 is the designed-for
/// "updates are available" exit, not a fault; it is valid here only.
const CHECK_UPDATE_RULES: &[CodeRule] = &[
    CodeRule {
        code: 0,
        outcome: Outcome::Success,
        severity: Severity::Info,
        template: "Operation was successful, No updates available.",
    },
    CodeRule {
        code: 1,
        outcome: Outcome::HandledError,
        severity: Severity::Error,
        template: "An error occurred, which was handled by dnf: {stderr}",
    },
    CodeRule {
        code: 3,
        outcome: Outcome::UnknownError,
        severity: Severity::Critical,
        template: "An unknown unhandled error occurred during operation: {stderr}",
    },
    CodeRule {
        code: 100,
        outcome: Outcome::UpdatesAvailable,
        severity: Severity::Info,
        template: "Updates are available.",
    },
    CodeRule {
        code: 200,
        outcome: Outcome::LockContention,
        severity: Severity::Warning,
        template: "There was a problem with acquiring or releasing of locks: {stderr}",
    },
];

/// Codes outside a command's table.
const UNEXPECTED_TEMPLATE: &str = "Unexpected return code {code}: stdout: {stdout} stderr: {stderr}";

/// Classify one finished invocation against `command`'s table.
pub fn classify(command: MaintCommand, result: &ProcessResult) -> StepResult {
    match command.rules().iter().find(|r| r.code == result.exit_code) {
        Some(rule) => StepResult {
            step: command.step_name().to_string(),
            outcome: rule.outcome,
            severity: rule.severity,
            message: render(rule.template, result),
            raw: Some(result.clone()),
        },
        None => StepResult {
            step: command.step_name().to_string(),
            outcome: Outcome::UnexpectedCode(result.exit_code),
            severity: Severity::Error,
            message: render(UNEXPECTED_TEMPLATE, result),
            raw: Some(result.clone()),
        },
    }
}

fn render(template: &str, result: &ProcessResult) -> String {
    template
        .replace("{code}", &result.exit_code.to_string())
        .replace("{stdout}", result.stdout.trim())
        .replace("{stderr}", result.stderr.trim())
}
