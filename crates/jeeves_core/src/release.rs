//! OS release identification.
//!
//! Reads the first line of the release file and matches the
//! `<Distro> Linux release <major>.<minor>` shape. Anything else, including
//! an unreadable file, degrades to `Unknown` and is reported through the
//! sink; identification is never fatal.

use crate::logsink::{LogSink, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

static RELEASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(CentOS|Rocky) Linux release (\d+\.\d+)").unwrap());

/// Recognized EL-family distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistroName {
    CentOS,
    Rocky,
    Unknown,
}

impl DistroName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CentOS => "CentOS",
            Self::Rocky => "Rocky",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DistroName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed distribution identity. `version` is present exactly when the
/// distribution is recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionInfo {
    pub name: DistroName,
    pub version: Option<String>,
}

impl DistributionInfo {
    pub fn unknown() -> Self {
        Self {
            name: DistroName::Unknown,
            version: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.name != DistroName::Unknown
    }
}

impl fmt::Display for DistributionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {}", self.name, version),
            None => f.write_str(self.name.as_str()),
        }
    }
}

/// Parse a single release line. Unrecognized content yields `Unknown`.
pub fn parse_release_line(line: &str) -> DistributionInfo {
    match RELEASE_RE.captures(line.trim()) {
        Some(caps) => {
            let name = match &caps[1] {
                "CentOS" => DistroName::CentOS,
                _ => DistroName::Rocky,
            };
            DistributionInfo {
                name,
                version: Some(caps[2].to_string()),
            }
        }
        None => DistributionInfo::unknown(),
    }
}

/// Read the release file and identify the distribution.
///
/// Only the first line matters. A missing or unreadable file is reported
/// at error severity and yields `Unknown`.
pub fn detect(path: &Path, log: &dyn LogSink) -> DistributionInfo {
    let line = match std::fs::read_to_string(path) {
        Ok(contents) => contents.lines().next().unwrap_or("").trim().to_string(),
        Err(err) => {
            log.log(
                Severity::Error,
                &format!("cannot read {}: {}", path.display(), err),
            );
            return DistributionInfo::unknown();
        }
    };
    log.log(Severity::Debug, &format!("read release line: {}", line));

    let info = parse_release_line(&line);
    match &info.version {
        Some(version) => log.log(
            Severity::Debug,
            &format!("distribution: {}, version: {}", info.name, version),
        ),
        None => log.log(
            Severity::Error,
            &format!(
                "unrecognized release format in {}: \"{}\"",
                path.display(),
                line
            ),
        ),
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logsink::MemorySink;
    use std::io::Write;

    #[test]
    fn test_parse_centos() {
        let info = parse_release_line("CentOS Linux release 9.3");
        assert_eq!(info.name, DistroName::CentOS);
        assert_eq!(info.version.as_deref(), Some("9.3"));
        assert!(info.is_supported());
    }

    #[test]
    fn test_parse_rocky_with_trailer() {
        let info = parse_release_line("Rocky Linux release 8.9 (Green Obsidian)");
        assert_eq!(info.name, DistroName::Rocky);
        assert_eq!(info.version.as_deref(), Some("8.9"));
    }

    #[test]
    fn test_parse_unrecognized_distro() {
        let info = parse_release_line("Fedora 39");
        assert_eq!(info.name, DistroName::Unknown);
        assert_eq!(info.version, None);
        assert!(!info.is_supported());
    }

    #[test]
    fn test_parse_requires_minor_version() {
        let info = parse_release_line("CentOS Linux release 9");
        assert_eq!(info.name, DistroName::Unknown);
        assert_eq!(info.version, None);
    }

    #[test]
    fn test_version_present_iff_recognized() {
        for line in ["CentOS Linux release 7.9", "Rocky Linux release 9.4", "Debian 12", ""] {
            let info = parse_release_line(line);
            assert_eq!(info.version.is_some(), info.name != DistroName::Unknown);
        }
    }

    #[test]
    fn test_detect_reads_first_line_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Rocky Linux release 9.3 (Blue Onyx)").unwrap();
        writeln!(file, "second line is ignored").unwrap();

        let sink = MemorySink::new();
        let info = detect(file.path(), &sink);
        assert_eq!(info.name, DistroName::Rocky);
        assert_eq!(info.version.as_deref(), Some("9.3"));
        assert!(sink.contains(Severity::Debug, "read release line"));
    }

    #[test]
    fn test_detect_missing_file_is_unknown() {
        let sink = MemorySink::new();
        let info = detect(Path::new("/no/such/release-file"), &sink);
        assert_eq!(info.name, DistroName::Unknown);
        assert!(sink.contains(Severity::Error, "cannot read"));
    }

    #[test]
    fn test_detect_reports_unrecognized_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "openSUSE Leap 15.5").unwrap();

        let sink = MemorySink::new();
        let info = detect(file.path(), &sink);
        assert_eq!(info.name, DistroName::Unknown);
        assert!(sink.contains(Severity::Error, "unrecognized release format"));
    }

    #[test]
    fn test_display() {
        assert_eq!(parse_release_line("CentOS Linux release 9.3").to_string(), "CentOS 9.3");
        assert_eq!(DistributionInfo::unknown().to_string(), "Unknown");
    }
}
