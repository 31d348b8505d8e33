//! Integration tests for jeevesctl library helpers: run log entries and
//! human-readable rendering.

use jeevesctl::output;
use jeevesctl::runlog::RunLogEntry;
use jeeves_core::classify::{Outcome, StepResult};
use jeeves_core::maintenance::PipelineReport;
use jeeves_core::release::{DistributionInfo, DistroName};
use jeeves_core::sessions::{SessionEntry, SessionRecord};
use jeeves_core::Severity;

fn sample_report(updates_available: bool) -> PipelineReport {
    let step = |name: &str, outcome: Outcome, severity: Severity, message: &str| StepResult {
        step: name.to_string(),
        outcome,
        severity,
        message: message.to_string(),
        raw: None,
    };
    PipelineReport {
        run_id: uuid::Uuid::new_v4(),
        started_at: chrono::Utc::now(),
        duration_ms: 840,
        steps: vec![
            step("clean", Outcome::Success, Severity::Info, "Operation was successful."),
            step(
                "evict-cache",
                Outcome::Success,
                Severity::Info,
                "Cache evicted: 2 entries removed from /var/cache/dnf.",
            ),
            step(
                "check-updates",
                if updates_available {
                    Outcome::UpdatesAvailable
                } else {
                    Outcome::Success
                },
                Severity::Info,
                if updates_available {
                    "Updates are available."
                } else {
                    "Operation was successful, No updates available."
                },
            ),
        ],
        updates_available,
    }
}

/// Test run log entry structure
#[test]
fn test_run_log_entry_structure() {
    let entry = RunLogEntry::new("maintain", true, 840, "updates_available=true".to_string());

    let json = serde_json::to_string(&entry).expect("RunLogEntry should serialize");
    assert!(json.contains("\"command\":\"maintain\""));
    assert!(json.contains("\"ok\":true"));
    assert!(json.contains("\"duration_ms\":840"));
    assert!(json.contains("updates_available=true"));

    // Round-trips cleanly.
    let back: RunLogEntry = serde_json::from_str(&json).expect("RunLogEntry should deserialize");
    assert_eq!(back.command, "maintain");
    assert!(back.ok);
}

/// Test appending entries builds a JSONL file
#[test]
fn test_run_log_append_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ctl.jsonl");

    let first = serde_json::to_string(&RunLogEntry::new("sessions", true, 12, "sessions=2 unavailable=0".to_string())).unwrap();
    let second = serde_json::to_string(&RunLogEntry::new("release", true, 1, "distribution=CentOS 9.3".to_string())).unwrap();
    RunLogEntry::append_line(&first, &path).unwrap();
    RunLogEntry::append_line(&second, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let parsed: serde_json::Value = serde_json::from_str(line).expect("each line is JSON");
        assert!(parsed.get("ts").is_some());
        assert!(parsed.get("req_id").is_some());
    }
}

/// Test report rendering shows every step and the verdict
#[test]
fn test_render_report() {
    let text = output::render_report(&sample_report(true));
    assert!(text.contains("clean"));
    assert!(text.contains("evict-cache"));
    assert!(text.contains("check-updates"));
    assert!(text.contains("Updates are available."));
    assert!(text.ends_with("Verdict: updates available\n"));

    let quiet = output::render_report(&sample_report(false));
    assert!(quiet.ends_with("Verdict: up to date\n"));
}

/// Test session rendering omits absent fields
#[test]
fn test_render_session_entry_omits_absent_fields() {
    let record = SessionRecord {
        session_id: "3".to_string(),
        since: Some("Mon 2024-03-04 09:12:44 CET".to_string()),
        leader: Some(1234),
        seat: Some("seat0".to_string()),
        state: Some("active".to_string()),
        unit: Some("session-3.scope".to_string()),
        ..SessionRecord::default()
    };

    let text = output::render_session_entry(&SessionEntry::Described(record));
    assert!(text.starts_with("Session 3 details:\n"));
    assert!(text.contains("  Since: Mon 2024-03-04 09:12:44 CET\n"));
    assert!(text.contains("  Leader: 1234\n"));
    assert!(text.contains("  Unit: session-3.scope\n"));
    // A tty session has no Display/Desktop/Idle lines at all.
    assert!(!text.contains("Display"));
    assert!(!text.contains("Desktop"));
    assert!(!text.contains("Idle"));
}

/// Test unavailable entries render with their reason
#[test]
fn test_render_unavailable_entry() {
    let entry = SessionEntry::Unavailable {
        session_id: "7".to_string(),
        reason: "exit 1: No session found".to_string(),
    };
    let text = output::render_session_entry(&entry);
    assert_eq!(text, "Session 7 details unavailable: exit 1: No session found\n");
}

/// Test directory rendering lists IDs first
#[test]
fn test_render_sessions_header() {
    let entries = vec![
        SessionEntry::Described(SessionRecord {
            session_id: "3".to_string(),
            ..SessionRecord::default()
        }),
        SessionEntry::Unavailable {
            session_id: "7".to_string(),
            reason: "exit 1".to_string(),
        },
    ];
    let text = output::render_sessions(&entries);
    assert!(text.starts_with("SESSION IDs: 3, 7\n"));
    assert!(text.contains("Session 3 details:"));
    assert!(text.contains("Session 7 details unavailable"));

    assert_eq!(output::render_sessions(&[]), "No active sessions.\n");
}

/// Test release rendering
#[test]
fn test_render_release() {
    let supported = DistributionInfo {
        name: DistroName::Rocky,
        version: Some("9.3".to_string()),
    };
    assert_eq!(output::render_release(&supported), "OS release: Rocky 9.3\n");
    assert_eq!(
        output::render_release(&DistributionInfo::unknown()),
        "OS release: Unknown\n"
    );
}
