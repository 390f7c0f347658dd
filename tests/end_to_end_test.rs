use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().starts_with(prefix))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_single_check_against_local_server() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("<html>ok</html>");
    });

    Command::cargo_bin("site-monitor")
        .unwrap()
        .current_dir(dir.path())
        .args(["-c", "-u", &server.url("/")])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] availability: HTTP 200"))
        .stdout(predicate::str::contains("performance:"))
        .stdout(predicate::str::contains("certificate").not());

    page.assert();
    let log = fs::read_to_string(dir.path().join("logs/monitor.log")).unwrap();
    assert!(log.lines().all(|l| serde_json::from_str::<serde_json::Value>(l).is_ok()));
    assert!(log.contains("\"check\":\"availability\""));
}

#[test]
fn test_failing_site_is_reported_critical() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    });

    Command::cargo_bin("site-monitor")
        .unwrap()
        .current_dir(dir.path())
        .args(["-u", &server.url("/health")])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[CRITICAL] availability: HTTP 503 (expected 200)",
        ));
}

#[test]
fn test_report_mode_writes_report_file() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200);
    });

    Command::cargo_bin("site-monitor")
        .unwrap()
        .current_dir(dir.path())
        .args(["-r", "-u", &server.url("/")])
        .assert()
        .success();

    let reports = files_with_prefix(&dir.path().join("reports"), "monitor_report_");
    assert_eq!(reports.len(), 1);
    let text = fs::read_to_string(&reports[0]).unwrap();
    assert!(text.contains(&server.url("/")));
    assert!(text.contains("[OK] availability"));
    assert!(text.contains("Hostname:"));
}

#[test]
fn test_optimizer_strips_css_and_js_with_backup_and_report() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("assets");
    fs::create_dir_all(assets.join("css")).unwrap();
    let css = "/* layout */\nbody {\n    margin: 0;\n    background: url(\"a//b.png\");\n}\n";
    let js = "// entry point\nconst greeting = \"hello // world\";\n\nfunction  hi() {\n    return greeting;\n}\n";
    fs::write(assets.join("css/site.css"), css).unwrap();
    fs::write(assets.join("app.js"), js).unwrap();
    fs::write(assets.join("vendor.min.js"), "/* untouched */").unwrap();

    Command::cargo_bin("asset-optimizer")
        .unwrap()
        .current_dir(dir.path())
        .args(["-c", "-j", "-b", "-r", "-d", "assets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Optimization finished"));

    let stripped_css = fs::read_to_string(assets.join("css/site.css")).unwrap();
    assert!(!stripped_css.contains("layout"));
    assert!(stripped_css.contains("url(\"a//b.png\")"));
    let stripped_js = fs::read_to_string(assets.join("app.js")).unwrap();
    assert!(!stripped_js.contains("entry point"));
    assert!(stripped_js.contains("\"hello // world\""));
    assert_eq!(
        fs::read_to_string(assets.join("vendor.min.js")).unwrap(),
        "/* untouched */"
    );

    assert_eq!(fs::read_to_string(assets.join("css/site.css.backup")).unwrap(), css);
    assert_eq!(fs::read_to_string(assets.join("app.js.backup")).unwrap(), js);
    assert_eq!(files_with_prefix(&dir.path().join("backups"), "assets_backup_").len(), 1);

    let saved = (css.len() - stripped_css.len()) + (js.len() - stripped_js.len());
    let reports = files_with_prefix(&dir.path().join("reports"), "optimization_report_");
    assert_eq!(reports.len(), 1);
    let text = fs::read_to_string(&reports[0]).unwrap();
    assert!(text.contains(&format!("Total saved (all logged runs): {} bytes", saved)));
}

#[test]
fn test_optimizer_missing_directory_exits_one() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("asset-optimizer")
        .unwrap()
        .current_dir(dir.path())
        .args(["-c", "-d", "nowhere"])
        .assert()
        .code(1);
}
