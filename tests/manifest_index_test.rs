use sha2::{Digest, Sha256};
use std::fs;
use tempfile::TempDir;
use wp_release::core::manifest::IndexSettings;
use wp_release::domain::model::FileIndex;
use wp_release::ManifestIndexer;

fn public_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("public");
    fs::create_dir_all(root.join("files/tickets")).unwrap();
    fs::write(root.join("files/tickets/OS-1.md"), "honeypot field").unwrap();
    fs::write(root.join("files/readme.txt"), "Stable tag: 1.0.37\n").unwrap();
    fs::write(root.join("files/empty.bin"), b"").unwrap();
    dir
}

#[test]
fn test_index_digests_match_content() {
    let dir = public_tree();
    let settings = IndexSettings {
        root: dir.path().join("public"),
        ..Default::default()
    };

    let written = ManifestIndexer::new(&settings).write().unwrap();
    let on_disk: FileIndex =
        serde_json::from_str(&fs::read_to_string(settings.output_path()).unwrap()).unwrap();

    assert_eq!(written, on_disk);
    assert_eq!(on_disk.files.len(), 3);
    for entry in &on_disk.files {
        let bytes = fs::read(settings.root.join(&entry.path)).unwrap();
        assert_eq!(entry.size, bytes.len() as u64);
        assert_eq!(entry.sha256, format!("{:x}", Sha256::digest(&bytes)));
        assert_eq!(entry.url, format!("/{}", entry.path));
    }
}

#[test]
fn test_reindex_is_stable_and_overwrites() {
    let dir = public_tree();
    let settings = IndexSettings {
        root: dir.path().join("public"),
        ..Default::default()
    };
    fs::write(settings.output_path(), "stale").unwrap();

    ManifestIndexer::new(&settings).write().unwrap();
    let first = fs::read_to_string(settings.output_path()).unwrap();
    ManifestIndexer::new(&settings).write().unwrap();
    let second = fs::read_to_string(settings.output_path()).unwrap();

    assert_eq!(first, second);
    assert!(!first.contains("stale"));
    assert!(!first.contains("index.json"));
}
