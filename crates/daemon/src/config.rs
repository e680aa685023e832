use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub journal: JournalSettings,
    #[serde(default)]
    pub edsm: EdsmSettings,
    #[serde(default)]
    pub modules: ModuleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Explicit journal directory; auto-discovered when empty.
    #[serde(default)]
    pub directory: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            directory: String::new(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdsmSettings {
    #[serde(default = "default_edsm_url")]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// EDSM account for scan submission; submission is off when either
    /// credential is empty.
    #[serde(default)]
    pub commander_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_true")]
    pub submit_scans: bool,
}

impl Default for EdsmSettings {
    fn default() -> Self {
        Self {
            url: default_edsm_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            commander_name: String::new(),
            api_key: String::new(),
            submit_scans: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSettings {
    #[serde(default = "default_true")]
    pub history: bool,
    #[serde(default = "default_true")]
    pub route: bool,
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Bodies valued above this raise a "high value" notice.
    #[serde(default = "default_high_value")]
    pub high_value_threshold: i64,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            history: true,
            route: true,
            notifications: true,
            high_value_threshold: default_high_value(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_edsm_url() -> String {
    edscout_edsm::client::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_high_value() -> i64 {
    1_000_000
}

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("edscout"))
}

/// Get the daemon config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("daemon.toml"))
}

/// Get the exploration history file path
pub fn history_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("history.json"))
}

/// Load daemon config from disk; a missing file means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<DaemonConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        return Ok(DaemonConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read daemon config at {}", path.display()))?;
    let config: DaemonConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse daemon config at {}", path.display()))?;
    Ok(config)
}

impl DaemonConfig {
    /// Journal directory override from config, if set.
    pub fn journal_dir_override(&self) -> Option<PathBuf> {
        if self.journal.directory.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.journal.directory))
        }
    }

    pub fn edsm_credentials(&self) -> Option<(&str, &str)> {
        if self.edsm.submit_scans
            && !self.edsm.commander_name.is_empty()
            && !self.edsm.api_key.is_empty()
        {
            Some((&self.edsm.commander_name, &self.edsm.api_key))
        } else {
            None
        }
    }
}
