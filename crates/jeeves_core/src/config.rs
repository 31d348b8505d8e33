//! Jeeves configuration.
//!
//! Config file: ~/.config/jeeves/config.toml or /etc/jeeves/config.toml.
//! Every field has a default; no config file needs to exist.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maintenance pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Package manager binary.
    #[serde(default = "default_dnf_program")]
    pub dnf_program: String,

    /// Directory whose contents the evict-cache stage removes.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Budget for `clean all` in seconds; 0 disables the budget.
    #[serde(default = "default_clean_timeout")]
    pub clean_timeout_secs: u64,

    /// Budget for `check-update` in seconds; 0 disables the budget.
    /// Metadata refresh against slow mirrors can take minutes.
    #[serde(default = "default_check_update_timeout")]
    pub check_update_timeout_secs: u64,
}

fn default_dnf_program() -> String {
    "dnf".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/var/cache/dnf")
}

fn default_clean_timeout() -> u64 {
    300
}

fn default_check_update_timeout() -> u64 {
    600
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            dnf_program: default_dnf_program(),
            cache_dir: default_cache_dir(),
            clean_timeout_secs: default_clean_timeout(),
            check_update_timeout_secs: default_check_update_timeout(),
        }
    }
}

impl MaintenanceConfig {
    pub fn clean_timeout(&self) -> Option<Duration> {
        budget(self.clean_timeout_secs)
    }

    pub fn check_update_timeout(&self) -> Option<Duration> {
        budget(self.check_update_timeout_secs)
    }
}

/// Session directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Session manager binary.
    #[serde(default = "default_loginctl_program")]
    pub loginctl_program: String,

    /// Budget per loginctl call in seconds; 0 disables the budget.
    #[serde(default = "default_sessions_timeout")]
    pub timeout_secs: u64,
}

fn default_loginctl_program() -> String {
    "loginctl".to_string()
}

fn default_sessions_timeout() -> u64 {
    10
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            loginctl_program: default_loginctl_program(),
            timeout_secs: default_sessions_timeout(),
        }
    }
}

impl SessionsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        budget(self.timeout_secs)
    }
}

/// Release identification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Single-line OS release identifier file.
    #[serde(default = "default_release_file")]
    pub file: PathBuf,
}

fn default_release_file() -> PathBuf {
    PathBuf::from("/etc/redhat-release")
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            file: default_release_file(),
        }
    }
}

fn budget(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Main Jeeves configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JeevesConfig {
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

impl JeevesConfig {
    /// Default user config path: ~/.config/jeeves/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("XDG_CONFIG_HOME"))
            .context("Cannot determine home directory")?;

        let config_dir = if home.contains("/.config") {
            PathBuf::from(home)
        } else {
            Path::new(&home).join(".config")
        };

        Ok(config_dir.join("jeeves").join("config.toml"))
    }

    /// System config path: /etc/jeeves/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/jeeves/config.toml")
    }

    /// Load configuration.
    ///
    /// Priority:
    /// 1. User config (~/.config/jeeves/config.toml)
    /// 2. System config (/etc/jeeves/config.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: JeevesConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = JeevesConfig::default();
        assert_eq!(config.maintenance.dnf_program, "dnf");
        assert_eq!(config.maintenance.cache_dir, PathBuf::from("/var/cache/dnf"));
        assert_eq!(config.sessions.loginctl_program, "loginctl");
        assert_eq!(config.release.file, PathBuf::from("/etc/redhat-release"));
    }

    #[test]
    fn test_zero_timeout_disables_budget() {
        let mut config = MaintenanceConfig::default();
        assert_eq!(config.clean_timeout(), Some(Duration::from_secs(300)));

        config.clean_timeout_secs = 0;
        assert_eq!(config.clean_timeout(), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: JeevesConfig = toml::from_str(
            "[maintenance]\ndnf_program = \"dnf5\"\n",
        )
        .unwrap();
        assert_eq!(config.maintenance.dnf_program, "dnf5");
        assert_eq!(config.maintenance.clean_timeout_secs, 300);
        assert_eq!(config.sessions.loginctl_program, "loginctl");
    }

    #[test]
    fn test_toml_round_trip() {
        let original = JeevesConfig {
            maintenance: MaintenanceConfig {
                dnf_program: "microdnf".to_string(),
                cache_dir: PathBuf::from("/tmp/cache"),
                clean_timeout_secs: 30,
                check_update_timeout_secs: 60,
            },
            ..JeevesConfig::default()
        };

        let toml = toml::to_string(&original).unwrap();
        let parsed: JeevesConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.maintenance.dnf_program, "microdnf");
        assert_eq!(parsed.maintenance.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(parsed.maintenance.clean_timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sessions]").unwrap();
        writeln!(file, "timeout_secs = 3").unwrap();

        let config = JeevesConfig::load_from(file.path()).unwrap();
        assert_eq!(config.sessions.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_load_from_bad_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [").unwrap();

        let err = JeevesConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
