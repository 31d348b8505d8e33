//! Human-readable rendering for jeevesctl.
//!
//! Render functions are pure and return the final text; commands print it.

use jeeves_core::maintenance::PipelineReport;
use jeeves_core::release::DistributionInfo;
use jeeves_core::sessions::SessionEntry;

/// Step table plus the updates verdict.
pub fn render_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Maintenance run {}\n", report.run_id));
    for step in &report.steps {
        out.push_str(&format!(
            "  {:<14} {:<18} {}\n",
            step.step,
            step.outcome.to_string(),
            step.message
        ));
    }
    let verdict = if report.updates_available {
        "updates available"
    } else {
        "up to date"
    };
    out.push_str(&format!("Verdict: {}\n", verdict));
    out
}

/// ID summary line followed by one detail block per session.
pub fn render_sessions(entries: &[SessionEntry]) -> String {
    if entries.is_empty() {
        return "No active sessions.\n".to_string();
    }

    let ids: Vec<&str> = entries.iter().map(|e| e.session_id()).collect();
    let mut out = format!("SESSION IDs: {}\n", ids.join(", "));
    for entry in entries {
        out.push('\n');
        out.push_str(&render_session_entry(entry));
    }
    out
}

/// One session block: header plus labeled lines, absent fields omitted.
pub fn render_session_entry(entry: &SessionEntry) -> String {
    match entry {
        SessionEntry::Described(record) => {
            let mut out = format!("Session {} details:\n", record.session_id);
            push_field(&mut out, "Since", record.since.as_deref());
            push_field(&mut out, "Leader", record.leader.map(|l| l.to_string()).as_deref());
            push_field(&mut out, "Seat", record.seat.as_deref());
            push_field(&mut out, "Display", record.display.as_deref());
            push_field(&mut out, "Service", record.service.as_deref());
            push_field(&mut out, "Desktop", record.desktop.as_deref());
            push_field(&mut out, "State", record.state.as_deref());
            push_field(&mut out, "Idle", record.idle.as_deref());
            push_field(&mut out, "Unit", record.unit.as_deref());
            out
        }
        SessionEntry::Unavailable { session_id, reason } => {
            format!("Session {} details unavailable: {}\n", session_id, reason)
        }
    }
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("  {}: {}\n", label, value));
    }
}

pub fn render_release(info: &DistributionInfo) -> String {
    if info.is_supported() {
        format!("OS release: {}\n", info)
    } else {
        "OS release: Unknown\n".to_string()
    }
}
