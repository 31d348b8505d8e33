//! Subcommand implementations.
//!
//! Each command wires the real runner and tracing sink into a core
//! component, prints the result, and appends a run log entry. Operational
//! failures are reported, not propagated: the process exits non-zero only
//! when jeevesctl itself cannot do its job.

use crate::output;
use crate::runlog::RunLogEntry;
use anyhow::Result;
use jeeves_core::maintenance::MaintenancePipeline;
use jeeves_core::sessions::SessionDirectory;
use jeeves_core::{JeevesConfig, LogSink, Severity, SystemRunner, TracingSink};
use std::time::Instant;

pub fn maintain(config: &JeevesConfig, json: bool) -> Result<()> {
    let runner = SystemRunner;
    let sink = TracingSink;
    let pipeline = MaintenancePipeline::new(&runner, &sink, &config.maintenance);

    let report = pipeline.run();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_report(&report));
    }

    let detail = format!(
        "updates_available={} steps_ok={}",
        report.updates_available,
        report.all_ok()
    );
    RunLogEntry::new("maintain", report.all_ok(), report.duration_ms, detail).write()?;
    Ok(())
}

pub fn sessions(config: &JeevesConfig, json: bool) -> Result<()> {
    let start = Instant::now();
    let runner = SystemRunner;
    let sink = TracingSink;
    let directory = SessionDirectory::new(&runner, &sink, &config.sessions);

    let (ok, detail) = match directory.build() {
        Ok(entries) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", output::render_sessions(&entries));
            }
            let unavailable = entries.iter().filter(|e| !e.is_available()).count();
            (
                unavailable == 0,
                format!("sessions={} unavailable={}", entries.len(), unavailable),
            )
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({ "error": err.to_string() }));
            } else {
                println!("{}", err);
            }
            (false, err.to_string())
        }
    };

    RunLogEntry::new("sessions", ok, start.elapsed().as_millis() as u64, detail).write()?;
    Ok(())
}

pub fn release(config: &JeevesConfig, json: bool) -> Result<()> {
    let start = Instant::now();
    let sink = TracingSink;

    let info = jeeves_core::release::detect(&config.release.file, &sink);
    if info.is_supported() {
        sink.log(Severity::Info, &format!("OS release determined: {}", info));
    } else {
        sink.log(Severity::Warning, &format!("Unsupported distribution: {}", info.name));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", output::render_release(&info));
    }

    let detail = format!("distribution={}", info);
    RunLogEntry::new("release", true, start.elapsed().as_millis() as u64, detail).write()?;
    Ok(())
}
