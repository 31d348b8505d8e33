//! Maintenance pipeline: clean, evict cache, check updates.
//!
//! Fail-soft: every stage's outcome is recorded and the next stage still
//! runs, so a failed cleanup cannot hide whether updates exist. Faults are
//! converted to stage outcomes at the stage boundary; the pipeline itself
//! never terminates abnormally.

use crate::classify::{classify, MaintCommand, Outcome, StepResult};
use crate::config::MaintenanceConfig;
use crate::invoke::{CommandRunner, InvokeError};
use crate::logsink::{LogSink, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Stage name for the filesystem eviction step.
const EVICT_STEP: &str = "evict-cache";

/// Filesystem failure during cache eviction.
#[derive(Debug, Error)]
#[error("cache eviction failed at {path}: {source}")]
pub struct OsFailure {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// What a successful eviction removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictStats {
    pub entries_removed: usize,
}

/// Aggregate result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// One entry per stage, in execution order, regardless of outcomes.
    pub steps: Vec<StepResult>,
    /// True iff the check-updates stage classified as UpdatesAvailable.
    pub updates_available: bool,
}

impl PipelineReport {
    /// True when every stage succeeded (updates existing counts as success).
    pub fn all_ok(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_success())
    }
}

/// Runs the maintenance stages in a fixed order.
pub struct MaintenancePipeline<'a> {
    runner: &'a dyn CommandRunner,
    log: &'a dyn LogSink,
    config: &'a MaintenanceConfig,
}

impl<'a> MaintenancePipeline<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        log: &'a dyn LogSink,
        config: &'a MaintenanceConfig,
    ) -> Self {
        Self {
            runner,
            log,
            config,
        }
    }

    /// Run all stages in order and report every stage's fate.
    pub fn run(&self) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        self.log
            .log(Severity::Info, &format!("maintenance run {} started", run_id));

        let clean = self.run_command_stage(MaintCommand::CleanAll, self.config.clean_timeout());
        let evict = self.run_eviction_stage();
        let check =
            self.run_command_stage(MaintCommand::CheckUpdate, self.config.check_update_timeout());

        let updates_available = check.outcome == Outcome::UpdatesAvailable;
        let verdict = if updates_available {
            "updates available"
        } else {
            "no updates pending"
        };
        self.log.log(
            Severity::Info,
            &format!("maintenance run {} finished: {}", run_id, verdict),
        );

        PipelineReport {
            run_id,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            steps: vec![clean, evict, check],
            updates_available,
        }
    }

    /// Run one dnf stage; hard invocation failures become stage outcomes.
    fn run_command_stage(&self, command: MaintCommand, timeout: Option<Duration>) -> StepResult {
        let program = self.config.dnf_program.as_str();
        self.log.log(
            Severity::Debug,
            &format!("running {} {}", program, command.args().join(" ")),
        );

        let step = match self.runner.run(program, command.args(), timeout) {
            Ok(result) => {
                self.log.log(
                    Severity::Trace,
                    &format!(
                        "{} exited {} after {}ms",
                        result.command_line(),
                        result.exit_code,
                        result.duration_ms
                    ),
                );
                classify(command, &result)
            }
            Err(err) => fault_step(command.step_name(), &err),
        };
        self.log.log(step.severity, &step.message);
        step
    }

    /// Evict the package cache; an OS failure becomes an UnknownError stage.
    fn run_eviction_stage(&self) -> StepResult {
        let step = match evict_cache(&self.config.cache_dir) {
            Ok(stats) => StepResult {
                step: EVICT_STEP.to_string(),
                outcome: Outcome::Success,
                severity: Severity::Info,
                message: format!(
                    "Cache evicted: {} entries removed from {}.",
                    stats.entries_removed,
                    self.config.cache_dir.display()
                ),
                raw: None,
            },
            Err(failure) => StepResult {
                step: EVICT_STEP.to_string(),
                outcome: Outcome::UnknownError,
                severity: Severity::Critical,
                message: failure.to_string(),
                raw: None,
            },
        };
        self.log.log(step.severity, &step.message);
        step
    }
}

/// Convert a hard invocation failure into a recorded stage outcome.
fn fault_step(step: &str, err: &InvokeError) -> StepResult {
    let (outcome, severity) = match err {
        InvokeError::TimedOut { .. } => (Outcome::TimedOut, Severity::Error),
        InvokeError::Spawn { .. } | InvokeError::Io { .. } => {
            (Outcome::UnknownError, Severity::Critical)
        }
    };
    StepResult {
        step: step.to_string(),
        outcome,
        severity,
        message: err.to_string(),
        raw: None,
    }
}

/// Remove everything under `dir`; the directory itself stays.
///
/// A missing directory counts as an already-empty cache.
pub fn evict_cache(dir: &Path) -> Result<EvictStats, OsFailure> {
    if !dir.exists() {
        return Ok(EvictStats::default());
    }
    let entries = fs::read_dir(dir).map_err(|source| OsFailure {
        path: dir.display().to_string(),
        source,
    })?;

    let mut entries_removed = 0;
    for entry in entries {
        let entry = entry.map_err(|source| OsFailure {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let removal = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removal.map_err(|source| OsFailure {
            path: path.display().to_string(),
            source,
        })?;
        entries_removed += 1;
    }
    Ok(EvictStats { entries_removed })
}
