use siteops::adapters::SystemCommandRunner;
use siteops::config::cli::{parse_or_exit, OptimizerArgs};
use siteops::core::{deps, report};
use siteops::utils::error::SiteOpsError;
use siteops::utils::{logger, validation::Validate};
use siteops::AssetOptimizer;

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
    let args: OptimizerArgs = parse_or_exit();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Err(e) = config.validate() {
        fail(&e);
    }

    logger::init_cli_logger(args.verbose, Some(&config.log_file))?;
    tracing::info!("🚀 Starting asset-optimizer on {}", config.root.display());
    if args.verbose {
        tracing::debug!("Optimizer config: {:?}", config);
    }

    let runner = SystemCommandRunner::new();
    if let Err(e) = deps::check_dependencies(&runner, &deps::optimizer_requirements(&config)) {
        fail(&e);
    }

    let optimizer = AssetOptimizer::new(runner, config);
    let summary = match optimizer.run().await {
        Ok(summary) => summary,
        Err(e) => fail(&e),
    };

    println!("✅ Optimization finished");
    println!(
        "   {} optimized, {} failed, {} bytes saved",
        summary.optimized,
        summary.failed,
        summary.bytes_saved()
    );

    let config = optimizer.config();
    if config.report {
        let path = report::write_optimization_report(
            &config.report_dir,
            &config.root,
            &config.log_file,
            Some(&summary),
        )?;
        println!("📄 Report saved to: {}", path.display());
    }

    Ok(())
}
