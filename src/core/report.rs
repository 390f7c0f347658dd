//! Plain-text reports for both tools.

use crate::adapters::resources::host_summary;
use crate::domain::model::{AssetKind, CheckResult, OptimizationSummary};
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RULE: &str = "==================================================";

fn report_path(dir: &Path, prefix: &str, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_report_{}.txt", prefix, at.format("%Y%m%d_%H%M%S")))
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!(report = %path.display(), "Report written to {}", path.display());
    Ok(())
}

pub fn render_monitor_report(
    url: &str,
    results: &[CheckResult],
    host: &[String],
    at: DateTime<Local>,
) -> String {
    let mut out = format!(
        "Website Monitor Report\n{}\nGenerated: {}\nURL: {}\n\nChecks\n",
        RULE,
        at.format("%Y-%m-%d %H:%M:%S"),
        url
    );
    for result in results {
        out.push_str(&format!("  {}\n", result.summary_line()));
    }
    out.push_str("\nSystem\n");
    for line in host {
        out.push_str(&format!("  {}\n", line));
    }
    out
}

pub fn write_monitor_report(
    report_dir: &Path,
    url: &str,
    results: &[CheckResult],
) -> Result<PathBuf> {
    let at = Local::now();
    let path = report_path(report_dir, "monitor", at);
    write_report(&path, &render_monitor_report(url, results, &host_summary(), at))?;
    Ok(path)
}

/// Sum of `bytes_saved` over the JSON records in a log file.
///
/// Lines that are not JSON, or carry no such field, count as zero. A missing
/// or unreadable file is a total of zero.
pub fn total_saved_from_log(log_file: &Path) -> u64 {
    let Ok(file) = fs::File::open(log_file) else {
        tracing::debug!("No optimization log at {}", log_file.display());
        return 0;
    };
    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str::<Value>(&line).ok())
        .filter_map(|record| record.pointer("/fields/bytes_saved").and_then(Value::as_u64))
        .sum()
}

/// File count and total size per kind for everything under `root`.
pub fn tree_inventory(root: &Path) -> BTreeMap<String, (usize, u64)> {
    let mut inventory = BTreeMap::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = AssetKind::from_path(entry.path()) else {
            continue;
        };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        let slot = inventory.entry(kind.to_string()).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += size;
    }
    inventory
}

pub fn render_optimization_report(
    root: &Path,
    inventory: &BTreeMap<String, (usize, u64)>,
    summary: Option<&OptimizationSummary>,
    logged_savings: u64,
    at: DateTime<Local>,
) -> String {
    let mut out = format!(
        "Asset Optimization Report\n{}\nGenerated: {}\nAsset directory: {}\n\nFiles\n",
        RULE,
        at.format("%Y-%m-%d %H:%M:%S"),
        root.display()
    );
    let mut total_size = 0;
    for (kind, (count, size)) in inventory {
        out.push_str(&format!("  {}: {} files, {} bytes\n", kind, count, size));
        total_size += size;
    }
    out.push_str(&format!("  Total size: {} bytes\n", total_size));

    if let Some(summary) = summary {
        out.push_str(&format!(
            "\nThis run\n  Processed: {} images, {} stylesheets, {} scripts\n  Optimized: {}, failed: {}, gzipped: {}\n  Saved: {} bytes\n",
            summary.images,
            summary.stylesheets,
            summary.scripts,
            summary.optimized,
            summary.failed,
            summary.gzipped,
            summary.bytes_saved()
        ));
    }

    out.push_str(&format!(
        "\nTotal saved (all logged runs): {} bytes\n",
        logged_savings
    ));
    out
}

pub fn write_optimization_report(
    report_dir: &Path,
    root: &Path,
    log_file: &Path,
    summary: Option<&OptimizationSummary>,
) -> Result<PathBuf> {
    let at = Local::now();
    let path = report_path(report_dir, "optimization", at);
    let contents = render_optimization_report(
        root,
        &tree_inventory(root),
        summary,
        total_saved_from_log(log_file),
        at,
    );
    write_report(&path, &contents)?;
    Ok(path)
}
