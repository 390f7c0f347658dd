use crate::config::{MonitorConfig, OptimizerConfig};
use crate::utils::error::{Result, SiteOpsError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional settings file shared by both tools. Every key is optional and
/// overrides the built-in default; command line flags override the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub monitor: Option<MonitorSection>,
    pub optimizer: Option<OptimizerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub expected_status: Option<u16>,
    pub interval_seconds: Option<u64>,
    pub alert_email: Option<String>,
    pub log_file: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub disk_path: Option<PathBuf>,
    pub thresholds: Option<ThresholdSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSection {
    pub excellent_ms: Option<u64>,
    pub good_ms: Option<u64>,
    pub acceptable_ms: Option<u64>,
    pub cert_warning_days: Option<i64>,
    pub cert_critical_days: Option<i64>,
    pub disk_warning_percent: Option<f64>,
    pub disk_critical_percent: Option<f64>,
    pub memory_warning_percent: Option<f64>,
    pub memory_critical_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerSection {
    pub root: Option<PathBuf>,
    pub size_threshold_bytes: Option<u64>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub png_quality_min: Option<u8>,
    pub png_quality_max: Option<u8>,
    pub webp_quality: Option<u8>,
    pub backup_dir: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub command_timeout_seconds: Option<u64>,
}

impl FileConfig {
    /// Loads and parses a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteOpsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| SiteOpsError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| SiteOpsError::config(format!("bad substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_monitor(&self, config: &mut MonitorConfig) {
        let Some(section) = &self.monitor else {
            return;
        };
        if let Some(url) = &section.url {
            config.url = url.clone();
        }
        if let Some(secs) = section.timeout_seconds {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(status) = section.expected_status {
            config.expected_status = status;
        }
        if let Some(secs) = section.interval_seconds {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(email) = &section.alert_email {
            config.alert_email = Some(email.clone());
        }
        if let Some(path) = &section.log_file {
            config.log_file = path.clone();
        }
        if let Some(path) = &section.report_dir {
            config.report_dir = path.clone();
        }
        if let Some(path) = &section.disk_path {
            config.disk_path = path.clone();
        }

        if let Some(t) = &section.thresholds {
            let target = &mut config.thresholds;
            if let Some(v) = t.excellent_ms {
                target.excellent_ms = v;
            }
            if let Some(v) = t.good_ms {
                target.good_ms = v;
            }
            if let Some(v) = t.acceptable_ms {
                target.acceptable_ms = v;
            }
            if let Some(v) = t.cert_warning_days {
                target.cert_warning_days = v;
            }
            if let Some(v) = t.cert_critical_days {
                target.cert_critical_days = v;
            }
            if let Some(v) = t.disk_warning_percent {
                target.disk_warning_percent = v;
            }
            if let Some(v) = t.disk_critical_percent {
                target.disk_critical_percent = v;
            }
            if let Some(v) = t.memory_warning_percent {
                target.memory_warning_percent = v;
            }
            if let Some(v) = t.memory_critical_percent {
                target.memory_critical_percent = v;
            }
        }
    }

    pub fn apply_optimizer(&self, config: &mut OptimizerConfig) {
        let Some(section) = &self.optimizer else {
            return;
        };
        if let Some(root) = &section.root {
            config.root = root.clone();
        }
        if let Some(v) = section.size_threshold_bytes {
            config.size_threshold_bytes = v;
        }
        if let Some(v) = section.max_width {
            config.max_width = v;
        }
        if let Some(v) = section.max_height {
            config.max_height = v;
        }
        if let Some(v) = section.jpeg_quality {
            config.jpeg_quality = v;
        }
        if let Some(v) = section.png_quality_min {
            config.png_quality_min = v;
        }
        if let Some(v) = section.png_quality_max {
            config.png_quality_max = v;
        }
        if let Some(v) = section.webp_quality {
            config.webp_quality = v;
        }
        if let Some(path) = &section.backup_dir {
            config.backup_dir = path.clone();
        }
        if let Some(path) = &section.report_dir {
            config.report_dir = path.clone();
        }
        if let Some(path) = &section.log_file {
            config.log_file = path.clone();
        }
        if let Some(secs) = section.command_timeout_seconds {
            config.command_timeout = Duration::from_secs(secs);
        }
    }
}
