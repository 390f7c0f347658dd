pub mod alert;
pub mod backup;
pub mod checks;
pub mod deps;
pub mod minify;
pub mod monitor;
pub mod optimizer;
pub mod report;

pub use crate::domain::model::{CheckResult, CheckStatus, OptimizationSummary};
pub use crate::domain::ports::{CommandRunner, HttpProbe, ResourceProbe};
pub use crate::utils::error::Result;
pub use alert::AlertDispatcher;
pub use monitor::SiteMonitor;
pub use optimizer::AssetOptimizer;
