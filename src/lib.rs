pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use config::{MonitorConfig, MonitorMode, OptimizerConfig};
pub use core::{AssetOptimizer, SiteMonitor};
pub use utils::error::{Result, SiteOpsError};
