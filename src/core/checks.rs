//! Threshold classification for monitor results.

use crate::config::MonitorThresholds;
use crate::domain::model::{CheckStatus, PerformanceTier};
use chrono::{DateTime, NaiveDateTime, Utc};

pub fn classify_performance(millis: u64, t: &MonitorThresholds) -> PerformanceTier {
    if millis < t.excellent_ms {
        PerformanceTier::Excellent
    } else if millis < t.good_ms {
        PerformanceTier::Good
    } else if millis < t.acceptable_ms {
        PerformanceTier::Acceptable
    } else {
        PerformanceTier::Poor
    }
}

/// `days <= critical` is Critical, `days <= warning` is Warning.
pub fn classify_certificate(days: i64, t: &MonitorThresholds) -> CheckStatus {
    if days <= t.cert_critical_days {
        CheckStatus::Critical
    } else if days <= t.cert_warning_days {
        CheckStatus::Warning
    } else {
        CheckStatus::Healthy
    }
}

pub fn classify_usage(percent: f64, warning: f64, critical: f64) -> CheckStatus {
    if percent >= critical {
        CheckStatus::Critical
    } else if percent >= warning {
        CheckStatus::Warning
    } else {
        CheckStatus::Healthy
    }
}

/// Reads the `notAfter=` line printed by `openssl x509 -noout -enddate`.
pub fn parse_not_after(text: &str) -> Option<DateTime<Utc>> {
    let line = text
        .lines()
        .find_map(|l| l.trim().strip_prefix("notAfter="))?;
    // openssl pads single-digit days with a second space
    let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, "%b %d %H:%M:%S %Y GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whole days left, rounded down. Negative once expired.
pub fn days_remaining(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (expiry - now).num_seconds();
    seconds.div_euclid(86_400)
}
