use crate::config::toml_config::FileConfig;
use crate::config::{AssetSelection, MonitorConfig, MonitorMode, OptimizerConfig};
use crate::utils::error::Result;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Compress images and strip CSS/JS for the static site")]
pub struct OptimizerArgs {
    /// Optimize images (jpg, png, gif, webp)
    #[arg(short, long)]
    pub images: bool,

    /// Optimize CSS files
    #[arg(short, long)]
    pub css: bool,

    /// Optimize JavaScript files
    #[arg(short, long)]
    pub js: bool,

    /// Optimize every asset type (the default when no type is given)
    #[arg(short, long)]
    pub all: bool,

    /// Archive the asset tree and keep .backup copies before changing files
    #[arg(short, long)]
    pub backup: bool,

    /// Write .gz siblings for CSS and JS
    #[arg(short, long)]
    pub gzip: bool,

    /// Write an optimization report when done
    #[arg(short, long)]
    pub report: bool,

    /// Asset root directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl OptimizerArgs {
    pub fn resolve(&self) -> Result<OptimizerConfig> {
        let mut config = OptimizerConfig::default();
        if let Some(path) = &self.config {
            FileConfig::from_file(path)?.apply_optimizer(&mut config);
        }

        if let Some(dir) = &self.dir {
            config.root = dir.clone();
        }
        config.selection = if self.all {
            AssetSelection::all()
        } else {
            AssetSelection {
                images: self.images,
                css: self.css,
                js: self.js,
            }
            .normalized()
        };
        config.backup |= self.backup;
        config.gzip |= self.gzip;
        config.report |= self.report;
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "site-monitor")]
#[command(about = "Availability, performance, certificate and host checks for the site")]
#[command(group(ArgGroup::new("mode").args(["check", "monitor", "report"])))]
pub struct MonitorArgs {
    /// Run every check once (default)
    #[arg(short, long)]
    pub check: bool,

    /// Run the checks forever, one sequence per interval
    #[arg(short, long)]
    pub monitor: bool,

    /// Run the checks once and write a report file
    #[arg(short, long)]
    pub report: bool,

    /// Target URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Seconds between check sequences in monitor mode
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Alert recipient
    #[arg(short, long)]
    pub email: Option<String>,

    /// Path to a TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl MonitorArgs {
    pub fn mode(&self) -> MonitorMode {
        if self.monitor {
            MonitorMode::Continuous
        } else if self.report {
            MonitorMode::Report
        } else {
            MonitorMode::Single
        }
    }

    pub fn resolve(&self) -> Result<MonitorConfig> {
        let mut config = MonitorConfig::default();
        if let Some(path) = &self.config {
            FileConfig::from_file(path)?.apply_monitor(&mut config);
        }

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(email) = &self.email {
            config.alert_email = Some(email.clone());
        }
        Ok(config)
    }
}

/// Parses the command line. Help and version exit 0; any other parse
/// failure prints usage and exits 1.
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}
