use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use wp_release::core::changelog::CompileOutcome;
use wp_release::{ReleaseEngine, ReleaseSettings, Toggles};

const BOOTSTRAP: &str = "<?php\n/**\n * Plugin Name: OrderSentinel\n * Version: 1.0.37\n * Text Domain: order-sentinel\n */\n";
const README: &str = "=== OrderSentinel ===\nStable tag: 1.0.36\n\n== Changelog ==\n= 1.0.36 = (2026-09-01)\n* Fix.\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "order-sentinel/order-sentinel.php", BOOTSTRAP);
    write(root, "order-sentinel/readme.txt", README);
    write(root, "order-sentinel/includes/os-honeypot.php", "<?php\n");
    write(root, "order-sentinel/mu-plugins/ordersentinel-diag.php", "<?php\n");
    write(root, "order-sentinel/tests/test-honeypot.php", "<?php\n");
    write(root, "order-sentinel/assets/.DS_Store", "");
    write(root, "order-sentinel/tools/deploy.ps1", "");
    write(root, "changelog.d/unreleased/added-csv-export.md", "- CSV export for research results.");
    write(root, "changelog.d/unreleased/fixed-nonce.md", "- Nonce check on bulk action.");
    write(root, "changelog.d/unreleased/tweak.md", "- Tweaked admin notice.");
    dir
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_full_release_build() -> Result<()> {
    let dir = repo();
    let settings = ReleaseSettings::new(dir.path(), Toggles::default(), date());

    let report = ReleaseEngine::new(&settings).run()?;

    assert_eq!(report.version.as_str(), "1.0.37");
    assert_eq!(
        report.changelog,
        Some(CompileOutcome::Compiled {
            fragments: 3,
            archived: 3,
            skipped: 0
        })
    );

    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md"))?;
    let added = changelog.find("### Added").unwrap();
    let changed = changelog.find("### Changed").unwrap();
    let fixed = changelog.find("### Fixed").unwrap();
    assert!(changelog.contains("## [1.0.37] — 2026-10-17"));
    assert!(added < changed && changed < fixed);
    assert!(changelog.contains("- Tweaked admin notice."));

    assert!(dir.path().join("changelog.d/1.0.37/fixed-nonce.md").exists());
    assert_eq!(fs::read_dir(dir.path().join("changelog.d/unreleased"))?.count(), 0);

    let readme = fs::read_to_string(dir.path().join("order-sentinel/readme.txt"))?;
    assert!(readme.contains("Stable tag: 1.0.37\n"));
    assert!(readme.contains("== Changelog ==\n= 1.0.37 = (2026-10-17)\n"));

    let zip_path = dir.path().join("dist/OrderSentinel-1.0.37.zip");
    assert_eq!(report.archive.path, zip_path);
    assert_eq!(
        zip_names(&zip_path),
        vec![
            "order-sentinel/includes/os-honeypot.php",
            "order-sentinel/order-sentinel.php",
            "order-sentinel/readme.txt",
        ]
    );

    // readme inside the ZIP already carries the new stable tag
    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path)?)?;
    let mut packed = String::new();
    archive
        .by_name("order-sentinel/readme.txt")?
        .read_to_string(&mut packed)?;
    assert!(packed.contains("Stable tag: 1.0.37"));

    Ok(())
}

#[test]
fn test_second_run_is_idempotent() -> Result<()> {
    let dir = repo();
    let settings = ReleaseSettings::new(dir.path(), Toggles::default(), date());
    let engine = ReleaseEngine::new(&settings);

    engine.run()?;
    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md"))?;
    let readme = fs::read_to_string(dir.path().join("order-sentinel/readme.txt"))?;

    let second = engine.run()?;

    assert_eq!(second.changelog, Some(CompileOutcome::NoFragments));
    assert!(!second.readme.unwrap().changed());
    assert_eq!(fs::read_to_string(dir.path().join("CHANGELOG.md"))?, changelog);
    assert_eq!(
        fs::read_to_string(dir.path().join("order-sentinel/readme.txt"))?,
        readme
    );
    assert_eq!(changelog.matches("## [1.0.37]").count(), 1);
    assert_eq!(readme.matches("= 1.0.37 =").count(), 1);
    assert_eq!(fs::read_dir(dir.path().join("changelog.d/1.0.37"))?.count(), 3);

    Ok(())
}

#[test]
fn test_include_mu_build() -> Result<()> {
    let dir = repo();
    let toggles = Toggles {
        exclude_mu: false,
        build_changelog: false,
        update_readme: false,
        tag: false,
    };
    let settings = ReleaseSettings::new(dir.path(), toggles, date());

    let report = ReleaseEngine::new(&settings).run()?;

    assert!(report
        .archive
        .entries
        .contains(&"order-sentinel/mu-plugins/ordersentinel-diag.php".to_string()));
    assert!(!dir.path().join("CHANGELOG.md").exists());
    assert!(dir.path().join("changelog.d/unreleased/fixed-nonce.md").exists());

    Ok(())
}

#[test]
fn test_version_from_constant_fallback() -> Result<()> {
    let dir = repo();
    write(
        dir.path(),
        "order-sentinel/order-sentinel.php",
        "<?php\ndefine( 'ORDER_SENTINEL_VERSION', '2.0.0' );\n",
    );
    let toggles = Toggles {
        build_changelog: false,
        update_readme: false,
        ..Toggles::default()
    };
    let settings = ReleaseSettings::new(dir.path(), toggles, date());

    let report = ReleaseEngine::new(&settings).run()?;

    assert_eq!(report.version.as_str(), "2.0.0");
    assert!(dir.path().join("dist/OrderSentinel-2.0.0.zip").exists());
    Ok(())
}
