use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Classification shared by every check. Anything but `Healthy` alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Warning,
    Critical,
}

impl CheckStatus {
    pub fn needs_alert(self) -> bool {
        !matches!(self, CheckStatus::Healthy)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Healthy => "OK",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Availability,
    Performance,
    Certificate,
    Disk,
    Memory,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckKind::Availability => "availability",
            CheckKind::Performance => "performance",
            CheckKind::Certificate => "certificate",
            CheckKind::Disk => "disk",
            CheckKind::Memory => "memory",
        };
        f.write_str(label)
    }
}

/// Load time buckets. Only `Poor` is considered a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl PerformanceTier {
    pub fn status(self) -> CheckStatus {
        match self {
            PerformanceTier::Poor => CheckStatus::Warning,
            _ => CheckStatus::Healthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub status: CheckStatus,
    pub detail: String,
    /// Milliseconds, days or percent depending on `kind`.
    pub measurement: Option<f64>,
}

impl CheckResult {
    pub fn new(kind: CheckKind, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            detail: detail.into(),
            measurement: None,
        }
    }

    pub fn with_measurement(mut self, value: f64) -> Self {
        self.measurement = Some(value);
        self
    }

    pub fn summary_line(&self) -> String {
        format!("[{}] {}: {}", self.status, self.kind, self.detail)
    }
}

/// Raw outcome of one HTTP fetch.
#[derive(Debug, Clone)]
pub struct HttpSample {
    pub status: u16,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDelivery {
    Sent(String),
    Dropped(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Jpeg,
    Png,
    Gif,
    Webp,
    Css,
    Js,
}

impl AssetKind {
    /// Case-insensitive extension match. Pre-minified bundles are ignored.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".min.css") || name.ends_with(".min.js") {
            return None;
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(AssetKind::Jpeg),
            "png" => Some(AssetKind::Png),
            "gif" => Some(AssetKind::Gif),
            "webp" => Some(AssetKind::Webp),
            "css" => Some(AssetKind::Css),
            "js" => Some(AssetKind::Js),
            _ => None,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(
            self,
            AssetKind::Jpeg | AssetKind::Png | AssetKind::Gif | AssetKind::Webp
        )
    }

    pub fn is_text(self) -> bool {
        matches!(self, AssetKind::Css | AssetKind::Js)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetKind::Jpeg => "jpeg",
            AssetKind::Png => "png",
            AssetKind::Gif => "gif",
            AssetKind::Webp => "webp",
            AssetKind::Css => "css",
            AssetKind::Js => "js",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Replaced with a strictly smaller version.
    Optimized,
    /// Attempted, but the result was not smaller.
    Kept,
    /// Below the size threshold or otherwise not attempted.
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub kind: AssetKind,
    pub original_size: u64,
    pub final_size: u64,
    pub action: FileAction,
    pub resized_to: Option<(u32, u32)>,
}

impl FileOutcome {
    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.final_size)
    }

    pub fn percent_saved(&self) -> u64 {
        percent_saved(self.original_size, self.final_size)
    }
}

/// Integer percentage of `before` removed. Zero when nothing was saved.
pub fn percent_saved(before: u64, after: u64) -> u64 {
    if before == 0 || after >= before {
        return 0;
    }
    (before - after) * 100 / before
}

#[derive(Debug, Clone, Default)]
pub struct OptimizationSummary {
    pub images: usize,
    pub stylesheets: usize,
    pub scripts: usize,
    pub optimized: usize,
    pub failed: usize,
    pub gzipped: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl OptimizationSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        if outcome.kind.is_image() {
            self.images += 1;
        } else if outcome.kind == AssetKind::Css {
            self.stylesheets += 1;
        } else {
            self.scripts += 1;
        }
        match outcome.action {
            FileAction::Optimized => self.optimized += 1,
            FileAction::Failed => self.failed += 1,
            FileAction::Kept | FileAction::Skipped => {}
        }
        self.bytes_before += outcome.original_size;
        self.bytes_after += outcome.final_size;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}
