use siteops::adapters::{ReqwestProbe, SysinfoProbe, SystemCommandRunner};
use siteops::config::cli::{parse_or_exit, MonitorArgs};
use siteops::core::{deps, report};
use siteops::utils::error::SiteOpsError;
use siteops::utils::{logger, validation::Validate};
use siteops::{MonitorMode, SiteMonitor};

fn fail(e: &SiteOpsError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: MonitorArgs = parse_or_exit();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Err(e) = config.validate() {
        fail(&e);
    }

    logger::init_cli_logger(args.verbose, Some(&config.log_file))?;
    tracing::info!("🚀 Starting site-monitor for {}", config.url);
    if args.verbose {
        tracing::debug!("Monitor config: {:?}", config);
    }

    let runner = SystemCommandRunner::new();
    if let Err(e) = deps::check_dependencies(&runner, &deps::monitor_requirements(&config)) {
        fail(&e);
    }

    let monitor = SiteMonitor::new(ReqwestProbe::new()?, runner, SysinfoProbe::new(), config);

    match args.mode() {
        MonitorMode::Single => {
            let results = monitor.run_checks().await;
            for result in &results {
                println!("{}", result.summary_line());
            }
        }
        MonitorMode::Continuous => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
                tracing::info!("Received Ctrl-C, shutting down");
            };
            monitor.run_continuous(shutdown, None).await;
        }
        MonitorMode::Report => {
            let results = monitor.run_checks().await;
            let path = report::write_monitor_report(
                &monitor.config().report_dir,
                &monitor.config().url,
                &results,
            )?;
            println!("📄 Report saved to: {}", path.display());
        }
    }

    Ok(())
}
