//! Append-only JSONL run log for jeevesctl invocations.
//!
//! XDG-compliant path discovery with a fallback chain; entries go to stdout
//! when no log file is writable, so a record always exists somewhere.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One line per jeevesctl invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// ISO 8601 timestamp
    pub ts: String,

    /// Request ID (UUID)
    pub req_id: String,

    /// Subcommand name
    pub command: String,

    /// Success flag
    pub ok: bool,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// One-line result detail
    pub detail: String,
}

impl RunLogEntry {
    pub fn new(command: &str, ok: bool, duration_ms: u64, detail: String) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            req_id: uuid::Uuid::new_v4().to_string(),
            command: command.to_string(),
            ok,
            duration_ms,
            detail,
        }
    }

    /// Discover log file path with fallback chain
    ///
    /// Priority:
    /// 1. $JEEVESCTL_LOG_FILE environment variable (explicit override)
    /// 2. $XDG_STATE_HOME/jeeves/ctl.jsonl (XDG standard)
    /// 3. ~/.local/state/jeeves/ctl.jsonl (XDG fallback)
    ///
    /// Never defaults to /var/log for non-root users.
    fn discover_log_path() -> Option<String> {
        if let Ok(path) = std::env::var("JEEVESCTL_LOG_FILE") {
            return Some(path);
        }

        if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
            return Some(format!("{}/jeeves/ctl.jsonl", xdg_state));
        }

        if let Ok(home) = std::env::var("HOME") {
            return Some(format!("{}/.local/state/jeeves/ctl.jsonl", home));
        }

        None
    }

    /// Write the entry to the discovered log file, falling back to stdout.
    pub fn write(&self) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        if let Some(path) = Self::discover_log_path() {
            if Self::append_line(&json, Path::new(&path)).is_ok() {
                return Ok(());
            }
        }

        println!("{}", json);
        Ok(())
    }

    /// Append one line to `path`, creating parent directories as needed.
    pub fn append_line(json: &str, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}
