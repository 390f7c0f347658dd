use crate::utils::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const BACKUP_SUFFIX: &str = "backup";

/// `<dir>/<root name>_backup_<YYYYMMDD_HHMMSS>.zip`
pub fn archive_path(root: &Path, backup_dir: &Path, at: DateTime<Local>) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "assets".to_string());
    backup_dir.join(format!("{}_backup_{}.zip", name, at.format("%Y%m%d_%H%M%S")))
}

/// Zips the whole tree under `root`. Entry names are relative to `root`.
pub fn archive_tree(root: &Path, destination: &Path) -> Result<u64> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(BufWriter::new(File::create(destination)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0u64;

    // A backup directory inside the tree holds this archive and older ones.
    let own_archive = destination.canonicalize().ok();
    let backup_dir = destination
        .parent()
        .and_then(|p| p.canonicalize().ok())
        .filter(|dir| Some(dir) != root.canonicalize().ok().as_ref());
    let excluded = |path: &Path| {
        let Ok(path) = path.canonicalize() else {
            return false;
        };
        Some(&path) == own_archive.as_ref() || Some(&path) == backup_dir.as_ref()
    };

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !excluded(e.path()));
    for entry in walker {
        let entry = entry?;
        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => continue,
        };
        // zip entry names always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            std::io::copy(&mut source, &mut zip)?;
            files += 1;
        }
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    tracing::info!(
        archive = %destination.display(),
        files,
        "Backup archive written"
    );
    Ok(files)
}

/// Copies `file` to `file.backup` next to it, replacing an older copy.
pub fn backup_file(file: &Path) -> Result<PathBuf> {
    let mut name = file.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_SUFFIX);
    let target = PathBuf::from(name);
    fs::copy(file, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_archive_path_uses_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = archive_path(Path::new("site/assets"), Path::new("backups"), at);
        assert_eq!(path, PathBuf::from("backups/assets_backup_20240309_140507.zip"));
    }

    #[test]
    fn test_archive_tree_contains_nested_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("assets");
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/site.css"), "body{}").unwrap();
        fs::write(root.join("logo.png"), [0u8; 16]).unwrap();

        let destination = dir.path().join("backups/a.zip");
        let count = archive_tree(&root, &destination).unwrap();
        assert_eq!(count, 2);

        let mut archive = zip::ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("css/site.css")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "body{}");
        assert!(archive.by_name("logo.png").is_ok());
    }

    #[test]
    fn test_archive_skips_backup_dir_inside_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("site");
        fs::create_dir_all(root.join("backups")).unwrap();
        fs::write(root.join("big.png"), [1u8; 64]).unwrap();
        fs::write(root.join("backups/site_backup_older.zip"), [2u8; 64]).unwrap();

        let destination = root.join("backups/site_backup_x.zip");
        assert_eq!(archive_tree(&root, &destination).unwrap(), 1);

        let archive = zip::ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec!["big.png"]);
    }

    #[test]
    fn test_archive_in_root_skips_only_itself() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("app.js"), "let a;").unwrap();

        let destination = root.join("site_backup_x.zip");
        assert_eq!(archive_tree(&root, &destination).unwrap(), 1);

        let archive = zip::ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["app.js"]);
    }

    #[test]
    fn test_backup_file_sibling() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "let a = 1;").unwrap();

        let backup = backup_file(&file).unwrap();
        assert_eq!(backup, dir.path().join("app.js.backup"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "let a = 1;");
    }
}
