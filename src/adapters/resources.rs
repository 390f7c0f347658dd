use crate::domain::ports::ResourceProbe;
use crate::utils::error::{Result, SiteOpsError};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::{Disks, System};

pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for SysinfoProbe {
    fn disk_usage_percent(&self, path: &Path) -> Result<f64> {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let disks = Disks::new_with_refreshed_list();
        let mounts: Vec<(PathBuf, u64, u64)> = disks
            .list()
            .iter()
            .map(|d| {
                (
                    d.mount_point().to_path_buf(),
                    d.total_space(),
                    d.available_space(),
                )
            })
            .collect();

        let (_, total, available) = mount_for(&target, &mounts).ok_or_else(|| {
            SiteOpsError::processing(format!("No mounted filesystem holds {}", target.display()))
        })?;
        usage_percent(*total, *available).ok_or_else(|| {
            SiteOpsError::processing(format!("Filesystem for {} reports zero size", target.display()))
        })
    }

    fn memory_usage_percent(&self) -> Result<f64> {
        let mut system = self
            .system
            .lock()
            .map_err(|_| SiteOpsError::processing("system info lock poisoned"))?;
        system.refresh_memory();
        let total = system.total_memory();
        let used = system.used_memory();
        usage_percent(total, total.saturating_sub(used))
            .ok_or_else(|| SiteOpsError::processing("Total memory reported as zero"))
    }
}

/// Longest mount point that is a prefix of `path`.
fn mount_for<'a>(
    path: &Path,
    mounts: &'a [(PathBuf, u64, u64)],
) -> Option<&'a (PathBuf, u64, u64)> {
    mounts
        .iter()
        .filter(|(mount, _, _)| path.starts_with(mount))
        .max_by_key(|(mount, _, _)| mount.components().count())
}

fn usage_percent(total: u64, available: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(used as f64 * 100.0 / total as f64)
}

/// Host facts for the monitor report.
pub fn host_summary() -> Vec<String> {
    let uptime = System::uptime();
    vec![
        format!(
            "Hostname: {}",
            System::host_name().unwrap_or_else(|| "unknown".to_string())
        ),
        format!(
            "OS: {}",
            System::long_os_version().unwrap_or_else(|| "unknown".to_string())
        ),
        format!("Uptime: {}d {}h {}m", uptime / 86_400, uptime % 86_400 / 3_600, uptime % 3_600 / 60),
    ]
}
