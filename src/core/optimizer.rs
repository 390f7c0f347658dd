use crate::config::OptimizerConfig;
use crate::core::backup;
use crate::core::minify::{minify_css, minify_js};
use crate::domain::model::{AssetKind, FileAction, FileOutcome, OptimizationSummary};
use crate::domain::ports::{CommandRunner, CommandSpec};
use crate::utils::error::{Result, SiteOpsError};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scales `(width, height)` down to fit inside the bounds, keeping the
/// aspect ratio. `None` when the image already fits.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width <= max_width && height <= max_height {
        return None;
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    Some((new_width, new_height))
}

fn parse_dimensions(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some((width, height))
}

/// Hidden sibling with the same extension, so tools pick the right format.
fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.siteops.{}", stem, ext))
}

pub fn saved_message(path: &Path, saved: u64, percent: u64) -> String {
    format!(
        "Optimized {}: saved {} bytes ({}%)",
        path.display(),
        saved,
        percent
    )
}

pub struct AssetOptimizer<R: CommandRunner> {
    runner: R,
    config: OptimizerConfig,
}

impl<R: CommandRunner> AssetOptimizer<R> {
    pub fn new(runner: R, config: OptimizerConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Files under the root the current selection covers. Hidden entries are skipped.
    pub fn discover(&self) -> Result<Vec<(PathBuf, AssetKind)>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.config.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(kind) = AssetKind::from_path(entry.path()) {
                if self.config.selection.includes(kind) {
                    files.push((entry.into_path(), kind));
                }
            }
        }
        Ok(files)
    }

    pub async fn run(&self) -> Result<OptimizationSummary> {
        if !self.config.root.is_dir() {
            return Err(SiteOpsError::config(format!(
                "Asset directory not found: {}",
                self.config.root.display()
            )));
        }

        if self.config.backup {
            let destination =
                backup::archive_path(&self.config.root, &self.config.backup_dir, Local::now());
            backup::archive_tree(&self.config.root, &destination)?;
        }

        let files = self.discover()?;
        tracing::info!(
            "Found {} asset files under {}",
            files.len(),
            self.config.root.display()
        );

        let mut summary = OptimizationSummary::default();
        for (path, kind) in &files {
            let outcome = match self.process_file(path, *kind).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(file = %path.display(), "Skipping {}: {}", path.display(), e);
                    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    FileOutcome {
                        path: path.clone(),
                        kind: *kind,
                        original_size: size,
                        final_size: size,
                        action: FileAction::Failed,
                        resized_to: None,
                    }
                }
            };
            summary.record(&outcome);
        }

        if self.config.gzip {
            for (path, kind) in files.iter().filter(|(_, k)| k.is_text()) {
                match self.gzip_file(path).await {
                    Ok(()) => summary.gzipped += 1,
                    Err(e) => tracing::warn!(
                        file = %path.display(),
                        "Gzip of {} ({}) failed: {}",
                        path.display(),
                        kind,
                        e
                    ),
                }
            }
        }

        tracing::info!(
            total_saved = summary.bytes_saved(),
            "Optimization finished: {} optimized, {} failed, {} bytes saved",
            summary.optimized,
            summary.failed,
            summary.bytes_saved()
        );
        Ok(summary)
    }

    pub async fn process_file(&self, path: &Path, kind: AssetKind) -> Result<FileOutcome> {
        let outcome = if kind.is_image() {
            self.optimize_image(path, kind).await?
        } else {
            self.optimize_text(path, kind)?
        };

        if outcome.action == FileAction::Optimized && outcome.bytes_saved() > 0 {
            let saved = outcome.bytes_saved();
            let percent = outcome.percent_saved();
            tracing::info!(
                file = %path.display(),
                kind = %kind,
                bytes_saved = saved,
                percent,
                "{}",
                saved_message(path, saved, percent)
            );
        }
        Ok(outcome)
    }

    async fn optimize_image(&self, path: &Path, kind: AssetKind) -> Result<FileOutcome> {
        let original_size = fs::metadata(path)?.len();
        let mut backed_up = false;
        let mut action = FileAction::Skipped;

        let (width, height) = self.image_dimensions(path).await?;
        let resized_to = fit_within(width, height, self.config.max_width, self.config.max_height);
        if let Some((new_width, new_height)) = resized_to {
            let tmp = temp_sibling(path);
            let spec = CommandSpec::new("convert", self.config.command_timeout)
                .path_arg(path)
                .arg("-resize")
                .arg(format!("{}x{}!", new_width, new_height))
                .path_arg(&tmp);
            self.run_producing(&spec, &tmp).await?;
            self.backup_once(path, &mut backed_up)?;
            fs::rename(&tmp, path)?;
            action = FileAction::Optimized;
            tracing::info!(
                file = %path.display(),
                "Resized {} from {}x{} to {}x{}",
                path.display(),
                width,
                height,
                new_width,
                new_height
            );
        }

        let current_size = fs::metadata(path)?.len();
        if current_size > self.config.size_threshold_bytes {
            let tmp = temp_sibling(path);
            if kind == AssetKind::Jpeg {
                fs::copy(path, &tmp)?;
            }
            let spec = self.compress_command(kind, path, &tmp);
            self.run_producing(&spec, &tmp).await?;

            let compressed_size = fs::metadata(&tmp)?.len();
            if compressed_size > 0 && compressed_size < current_size {
                self.backup_once(path, &mut backed_up)?;
                fs::rename(&tmp, path)?;
                action = FileAction::Optimized;
            } else {
                fs::remove_file(&tmp)?;
                tracing::debug!(
                    file = %path.display(),
                    "Compressed {} is not smaller ({} >= {}), keeping original",
                    path.display(),
                    compressed_size,
                    current_size
                );
                if action == FileAction::Skipped {
                    action = FileAction::Kept;
                }
            }
        } else {
            tracing::debug!(
                file = %path.display(),
                "{} is {} bytes, below threshold {}",
                path.display(),
                current_size,
                self.config.size_threshold_bytes
            );
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            kind,
            original_size,
            final_size: fs::metadata(path)?.len(),
            action,
            resized_to,
        })
    }

    fn optimize_text(&self, path: &Path, kind: AssetKind) -> Result<FileOutcome> {
        let source = fs::read_to_string(path)?;
        let stripped = match kind {
            AssetKind::Css => minify_css(&source),
            AssetKind::Js => minify_js(&source),
            other => {
                return Err(SiteOpsError::processing(format!(
                    "{} is not a text asset",
                    other
                )))
            }
        };

        let original_size = source.len() as u64;
        let mut action = FileAction::Kept;
        if (stripped.len() as u64) < original_size {
            let mut backed_up = false;
            self.backup_once(path, &mut backed_up)?;
            let tmp = temp_sibling(path);
            fs::write(&tmp, &stripped)?;
            fs::rename(&tmp, path)?;
            action = FileAction::Optimized;
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            kind,
            original_size,
            final_size: fs::metadata(path)?.len(),
            action,
            resized_to: None,
        })
    }

    fn compress_command(&self, kind: AssetKind, source: &Path, output: &Path) -> CommandSpec {
        let timeout = self.config.command_timeout;
        match kind {
            AssetKind::Jpeg => CommandSpec::new("jpegoptim", timeout)
                .arg(format!("--max={}", self.config.jpeg_quality))
                .arg("--strip-all")
                .arg("--quiet")
                .path_arg(output),
            AssetKind::Png => CommandSpec::new("pngquant", timeout)
                .arg(format!(
                    "--quality={}-{}",
                    self.config.png_quality_min, self.config.png_quality_max
                ))
                .arg("--force")
                .arg("--output")
                .path_arg(output)
                .path_arg(source),
            AssetKind::Gif => CommandSpec::new("gifsicle", timeout)
                .arg("-O3")
                .path_arg(source)
                .arg("-o")
                .path_arg(output),
            // webp; text assets never reach here
            _ => CommandSpec::new("cwebp", timeout)
                .arg("-quiet")
                .arg("-q")
                .arg(self.config.webp_quality.to_string())
                .path_arg(source)
                .arg("-o")
                .path_arg(output),
        }
    }

    async fn image_dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        // first frame only, animated GIFs report one size per frame
        let spec = CommandSpec::new("identify", self.config.command_timeout)
            .arg("-format")
            .arg("%w %h")
            .arg(format!("{}[0]", path.display()));
        let output = self.runner.run(&spec).await?;
        if !output.success {
            return Err(SiteOpsError::command("identify", output.stderr_text()));
        }
        parse_dimensions(&output.stdout_text()).ok_or_else(|| {
            SiteOpsError::command(
                "identify",
                format!("unexpected output '{}'", output.stdout_text().trim()),
            )
        })
    }

    /// Runs a command that must leave `output` behind. Cleans up on failure.
    async fn run_producing(&self, spec: &CommandSpec, output: &Path) -> Result<()> {
        let result = self.runner.run(spec).await;
        let failure = match result {
            Ok(out) if out.success && output.is_file() => return Ok(()),
            Ok(out) if out.success => {
                SiteOpsError::command(&spec.program, "produced no output file")
            }
            Ok(out) => SiteOpsError::command(
                &spec.program,
                format!("exit status {:?}: {}", out.code, out.stderr_text()),
            ),
            Err(e) => e,
        };
        if output.exists() {
            let _ = fs::remove_file(output);
        }
        Err(failure)
    }

    fn backup_once(&self, path: &Path, backed_up: &mut bool) -> Result<()> {
        if self.config.backup && !*backed_up {
            backup::backup_file(path)?;
            *backed_up = true;
        }
        Ok(())
    }

    async fn gzip_file(&self, path: &Path) -> Result<()> {
        let spec = CommandSpec::new("gzip", self.config.command_timeout)
            .arg("-9")
            .arg("-k")
            .arg("-f")
            .path_arg(path);
        let output = self.runner.run(&spec).await?;
        if !output.success {
            return Err(SiteOpsError::command("gzip", output.stderr_text()));
        }
        Ok(())
    }
}
