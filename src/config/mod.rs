#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::AssetKind;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_ascending, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorThresholds {
    pub excellent_ms: u64,
    pub good_ms: u64,
    pub acceptable_ms: u64,
    pub cert_warning_days: i64,
    pub cert_critical_days: i64,
    pub disk_warning_percent: f64,
    pub disk_critical_percent: f64,
    pub memory_warning_percent: f64,
    pub memory_critical_percent: f64,
}

impl Default for MonitorThresholds {
    fn default() -> Self {
        Self {
            excellent_ms: 1000,
            good_ms: 2000,
            acceptable_ms: 3000,
            cert_warning_days: 30,
            cert_critical_days: 7,
            disk_warning_percent: 80.0,
            disk_critical_percent: 90.0,
            memory_warning_percent: 80.0,
            memory_critical_percent: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorMode {
    #[default]
    Single,
    Continuous,
    Report,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub url: String,
    pub timeout: Duration,
    pub expected_status: u16,
    pub interval: Duration,
    pub alert_email: Option<String>,
    pub log_file: PathBuf,
    pub report_dir: PathBuf,
    pub disk_path: PathBuf,
    pub thresholds: MonitorThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            timeout: Duration::from_secs(10),
            expected_status: 200,
            interval: Duration::from_secs(300),
            alert_email: None,
            log_file: PathBuf::from("logs/monitor.log"),
            report_dir: PathBuf::from("reports"),
            disk_path: PathBuf::from("/"),
            thresholds: MonitorThresholds::default(),
        }
    }
}

impl MonitorConfig {
    pub fn is_https(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|u| u.scheme() == "https")
    }
}

impl Validate for MonitorConfig {
    fn validate(&self) -> Result<()> {
        validate_url("monitor.url", &self.url)?;
        validate_positive_number("monitor.timeout_seconds", self.timeout.as_secs(), 1)?;
        validate_positive_number("monitor.interval_seconds", self.interval.as_secs(), 1)?;
        validate_range("monitor.expected_status", self.expected_status, 100, 599)?;
        validate_path("monitor.log_file", &self.log_file.to_string_lossy())?;
        validate_path("monitor.report_dir", &self.report_dir.to_string_lossy())?;

        let t = &self.thresholds;
        validate_ascending("monitor.thresholds.excellent_ms/good_ms", t.excellent_ms, t.good_ms)?;
        validate_ascending("monitor.thresholds.good_ms/acceptable_ms", t.good_ms, t.acceptable_ms)?;
        validate_ascending(
            "monitor.thresholds.cert_critical_days/cert_warning_days",
            t.cert_critical_days,
            t.cert_warning_days,
        )?;
        validate_ascending(
            "monitor.thresholds.disk_warning_percent/disk_critical_percent",
            t.disk_warning_percent,
            t.disk_critical_percent,
        )?;
        validate_ascending(
            "monitor.thresholds.memory_warning_percent/memory_critical_percent",
            t.memory_warning_percent,
            t.memory_critical_percent,
        )?;
        Ok(())
    }
}

/// Which asset families a run touches. Nothing selected means everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetSelection {
    pub images: bool,
    pub css: bool,
    pub js: bool,
}

impl AssetSelection {
    pub fn all() -> Self {
        Self {
            images: true,
            css: true,
            js: true,
        }
    }

    pub fn normalized(self) -> Self {
        if !self.images && !self.css && !self.js {
            Self::all()
        } else {
            self
        }
    }

    pub fn includes(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Css => self.css,
            AssetKind::Js => self.js,
            _ => self.images,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub root: PathBuf,
    pub size_threshold_bytes: u64,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    pub png_quality_min: u8,
    pub png_quality_max: u8,
    pub webp_quality: u8,
    pub selection: AssetSelection,
    pub backup: bool,
    pub gzip: bool,
    pub report: bool,
    pub backup_dir: PathBuf,
    pub report_dir: PathBuf,
    pub log_file: PathBuf,
    pub command_timeout: Duration,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            size_threshold_bytes: 500_000,
            max_width: 1920,
            max_height: 1080,
            jpeg_quality: 85,
            png_quality_min: 65,
            png_quality_max: 85,
            webp_quality: 80,
            selection: AssetSelection::all(),
            backup: false,
            gzip: false,
            report: false,
            backup_dir: PathBuf::from("backups"),
            report_dir: PathBuf::from("reports"),
            log_file: PathBuf::from("logs/optimization.log"),
            command_timeout: Duration::from_secs(120),
        }
    }
}

impl Validate for OptimizerConfig {
    fn validate(&self) -> Result<()> {
        validate_path("optimizer.root", &self.root.to_string_lossy())?;
        validate_path("optimizer.backup_dir", &self.backup_dir.to_string_lossy())?;
        validate_path("optimizer.report_dir", &self.report_dir.to_string_lossy())?;
        validate_path("optimizer.log_file", &self.log_file.to_string_lossy())?;
        validate_positive_number("optimizer.max_width", self.max_width.into(), 1)?;
        validate_positive_number("optimizer.max_height", self.max_height.into(), 1)?;
        validate_positive_number(
            "optimizer.command_timeout_seconds",
            self.command_timeout.as_secs(),
            1,
        )?;
        validate_range("optimizer.jpeg_quality", self.jpeg_quality, 1, 100)?;
        validate_range("optimizer.webp_quality", self.webp_quality, 1, 100)?;
        validate_range("optimizer.png_quality_min", self.png_quality_min, 0, 100)?;
        validate_range("optimizer.png_quality_max", self.png_quality_max, 1, 100)?;
        validate_ascending(
            "optimizer.png_quality_min/png_quality_max",
            self.png_quality_min,
            self.png_quality_max,
        )?;
        Ok(())
    }
}
