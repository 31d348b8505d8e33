//! Login session directory.
//!
//! Lists active logind sessions and describes each one independently: a
//! failed or partial lookup marks that single entry unavailable with its
//! reason, and the rest of the batch is unaffected. Detail fields are all
//! optional; logind omits lines depending on session type and version.

use crate::config::SessionsConfig;
use crate::extract::{labeled_field, leading_tokens, leading_u32};
use crate::invoke::CommandRunner;
use crate::logsink::{LogSink, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details of one session. Only `session_id` is guaranteed; every labeled
/// field degrades to `None` when logind does not print it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub since: Option<String>,
    /// PID of the session leader process.
    pub leader: Option<u32>,
    pub seat: Option<String>,
    pub display: Option<String>,
    pub service: Option<String>,
    pub desktop: Option<String>,
    pub state: Option<String>,
    pub idle: Option<String>,
    /// Scope unit name, first token of the Unit line.
    pub unit: Option<String>,
}

/// One directory entry: a described session, or the reason it could not be.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionEntry {
    Described(SessionRecord),
    Unavailable { session_id: String, reason: String },
}

impl SessionEntry {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Described(record) => &record.session_id,
            Self::Unavailable { session_id, .. } => session_id,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Described(_))
    }
}

/// The session listing itself could not be obtained. Distinct from an empty
/// listing, which is a valid state.
#[derive(Debug, Error)]
#[error("session listing unavailable: {reason}")]
pub struct DirectoryUnavailable {
    pub reason: String,
}

/// Builds the session directory through `loginctl`.
pub struct SessionDirectory<'a> {
    runner: &'a dyn CommandRunner,
    log: &'a dyn LogSink,
    config: &'a SessionsConfig,
}

impl<'a> SessionDirectory<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        log: &'a dyn LogSink,
        config: &'a SessionsConfig,
    ) -> Self {
        Self {
            runner,
            log,
            config,
        }
    }

    /// Active session IDs, one per listing line.
    pub fn list_session_ids(&self) -> Result<Vec<String>, DirectoryUnavailable> {
        let run = self.runner.run(
            &self.config.loginctl_program,
            &["list-sessions", "--no-legend"],
            self.config.timeout(),
        );
        match run {
            Ok(result) if result.exit_code == 0 => {
                let ids: Vec<String> = leading_tokens(&result.stdout)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                self.log
                    .log(Severity::Debug, &format!("{} active sessions", ids.len()));
                Ok(ids)
            }
            Ok(result) => Err(DirectoryUnavailable {
                reason: format!("exit {}: {}", result.exit_code, result.stderr.trim()),
            }),
            Err(err) => Err(DirectoryUnavailable {
                reason: err.to_string(),
            }),
        }
    }

    /// Describe one session. Failures degrade to an `Unavailable` entry.
    pub fn describe(&self, session_id: &str) -> SessionEntry {
        let run = self.runner.run(
            &self.config.loginctl_program,
            &["session-status", session_id, "-o", "short"],
            self.config.timeout(),
        );
        match run {
            Ok(result) if result.exit_code == 0 => {
                self.log
                    .log(Severity::Trace, &format!("session {} described", session_id));
                SessionEntry::Described(parse_session_status(session_id, &result.stdout))
            }
            Ok(result) => {
                let reason = format!("exit {}: {}", result.exit_code, result.stderr.trim());
                self.log.log(
                    Severity::Warning,
                    &format!("session {} lookup failed: {}", session_id, reason),
                );
                SessionEntry::Unavailable {
                    session_id: session_id.to_string(),
                    reason,
                }
            }
            Err(err) => {
                let reason = err.to_string();
                self.log.log(
                    Severity::Warning,
                    &format!("session {} lookup failed: {}", session_id, reason),
                );
                SessionEntry::Unavailable {
                    session_id: session_id.to_string(),
                    reason,
                }
            }
        }
    }

    /// Full directory: every listed ID described independently, in listing
    /// order. One bad record never poisons the batch.
    pub fn build(&self) -> Result<Vec<SessionEntry>, DirectoryUnavailable> {
        let ids = self.list_session_ids()?;
        Ok(ids.iter().map(|id| self.describe(id)).collect())
    }
}

/// Parse `session-status -o short` output into a record. Missing labels
/// stay `None`.
pub fn parse_session_status(session_id: &str, output: &str) -> SessionRecord {
    SessionRecord {
        session_id: session_id.to_string(),
        since: labeled_field(output, "Since").map(str::to_string),
        leader: labeled_field(output, "Leader").and_then(leading_u32),
        seat: labeled_field(output, "Seat").map(str::to_string),
        display: labeled_field(output, "Display").map(str::to_string),
        service: labeled_field(output, "Service").map(str::to_string),
        desktop: labeled_field(output, "Desktop").map(str::to_string),
        state: labeled_field(output, "State").map(str::to_string),
        idle: labeled_field(output, "Idle").map(str::to_string),
        unit: labeled_field(output, "Unit")
            .and_then(|v| v.split_whitespace().next())
            .map(str::to_string),
    }
}
