use crate::config::{MonitorConfig, OptimizerConfig};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SiteOpsError};

/// Programs the optimizer shells out to for the selected work.
pub fn optimizer_requirements(config: &OptimizerConfig) -> Vec<&'static str> {
    let mut required = Vec::new();
    if config.selection.images {
        required.extend(["identify", "convert", "jpegoptim", "pngquant", "gifsicle", "cwebp"]);
    }
    if config.gzip && (config.selection.css || config.selection.js) {
        required.push("gzip");
    }
    required
}

/// Programs the monitor cannot work without. Mail programs are optional.
pub fn monitor_requirements(config: &MonitorConfig) -> Vec<&'static str> {
    if config.is_https() {
        vec!["openssl"]
    } else {
        Vec::new()
    }
}

/// Fails with every absent program listed, after printing install hints.
pub fn check_dependencies<R: CommandRunner + ?Sized>(runner: &R, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|program| !runner.is_available(program))
        .map(|program| program.to_string())
        .collect();

    if missing.is_empty() {
        tracing::debug!("All {} required programs found", required.len());
        return Ok(());
    }

    for program in &missing {
        tracing::error!(program = %program, "Required program not found");
    }
    for line in install_guidance(std::env::consts::OS, &missing) {
        eprintln!("{}", line);
    }

    Err(SiteOpsError::MissingDependencies { missing })
}

fn package_for(program: &str) -> &str {
    match program {
        "identify" | "convert" => "imagemagick",
        "cwebp" => "webp",
        "openssl" => "openssl",
        "mail" => "mailutils",
        other => other,
    }
}

pub fn install_guidance(os: &str, missing: &[String]) -> Vec<String> {
    let mut packages: Vec<&str> = missing.iter().map(|p| package_for(p)).collect();
    packages.dedup();
    let packages = packages.join(" ");

    match os {
        "linux" => vec![
            "Install the missing programs with your package manager:".to_string(),
            format!("  Debian/Ubuntu: sudo apt-get install {}", packages),
            format!("  Fedora/RHEL:   sudo dnf install {}", packages.replace("webp", "libwebp-tools")),
        ],
        "macos" => vec![
            "Install the missing programs with Homebrew:".to_string(),
            format!("  brew install {}", packages),
        ],
        _ => vec![format!(
            "Install these programs and add them to PATH: {}",
            missing.join(", ")
        )],
    }
}
