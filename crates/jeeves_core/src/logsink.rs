//! Log sink capability.
//!
//! Components report through an injected `LogSink` instead of talking to a
//! process-global logger. The production sink forwards to `tracing`; tests
//! inject a memory sink and assert on what was reported at which severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Message severity, lowest to highest.
///
/// `Trace` sits below `Debug` and carries fine-grained diagnostics such as
/// raw command output and parsed field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability for severity-tagged log output.
pub trait LogSink {
    fn log(&self, severity: Severity, message: &str);
}

/// Forwards messages to the `tracing` macros.
///
/// `tracing` has no level above error, so `Critical` is emitted as an error
/// carrying a `critical` marker field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Trace => tracing::trace!("{}", message),
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
            Severity::Critical => tracing::error!(critical = true, "{}", message),
        }
    }
}

/// Records every message in memory. Test double for `TracingSink`.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far, in order.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.lock().clone()
    }

    /// True if any message at `severity` contains `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|(sev, msg)| *sev == severity && msg.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Severity, String)>> {
        // A poisoned lock only means a test thread panicked mid-log.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        self.lock().push((severity, message.to_string()));
    }
}
