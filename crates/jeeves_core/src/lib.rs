//! Jeeves Core - host maintenance and session inspection for EL systems.
//!
//! Orchestrates dnf and loginctl through their exit codes and text output:
//! a fail-soft maintenance pipeline (clean, evict cache, check updates),
//! a login session directory with per-record isolation, OS release
//! identification, and the text extraction primitives these rely on.
//!
//! v0.9.0: table-driven exit-code classifier, injectable log sink.

pub mod classify;
pub mod config;
pub mod extract;
pub mod invoke;
pub mod logsink;
pub mod maintenance;
pub mod release;
pub mod sessions;

pub use classify::{classify, MaintCommand, Outcome, StepResult};
pub use config::JeevesConfig;
pub use invoke::{invoke, CommandRunner, InvokeError, ProcessResult, SystemRunner};
pub use logsink::{LogSink, MemorySink, Severity, TracingSink};
pub use maintenance::{evict_cache, EvictStats, MaintenancePipeline, OsFailure, PipelineReport};
pub use release::{DistributionInfo, DistroName};
pub use sessions::{DirectoryUnavailable, SessionDirectory, SessionEntry, SessionRecord};
