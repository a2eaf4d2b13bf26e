use crate::domain::model::{FileIndex, ManifestEntry};
use crate::utils::error::Result;
use crate::utils::fs::{to_posix, write_text};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Public output root, `public` by default.
    pub root: PathBuf,
    /// Directory under `root` that is walked.
    pub files_dir: String,
    /// Extra archive under `root` indexed when present.
    pub bundle: Option<String>,
    pub output: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            files_dir: "files".to_string(),
            bundle: Some("bundle/ordersentinel-code.tar.gz".to_string()),
            output: "index.json".to_string(),
        }
    }
}

impl IndexSettings {
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}

/// Streams a file through SHA-256 and returns `(size, lowercase hex digest)`.
pub fn sha256_file(path: &Path) -> Result<(u64, String)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((size, format!("{:x}", hasher.finalize())))
}

fn entry_for(root: &Path, path: &Path) -> Result<ManifestEntry> {
    let rel = to_posix(path.strip_prefix(root).unwrap_or(path));
    let (size, sha256) = sha256_file(path)?;
    Ok(ManifestEntry {
        url: format!("/{}", rel),
        path: rel,
        size,
        sha256,
    })
}

/// Collects regular files under `dir`. Symlinked directories are not
/// descended; unreadable directories are logged and skipped.
fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("[skip] {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("[skip] entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => walk_files(&path, out),
            Ok(t) if t.is_file() || (t.is_symlink() && path.is_file()) => out.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("[skip] {}: {}", path.display(), e),
        }
    }
}

pub struct ManifestIndexer<'a> {
    settings: &'a IndexSettings,
}

impl<'a> ManifestIndexer<'a> {
    pub fn new(settings: &'a IndexSettings) -> Self {
        Self { settings }
    }

    /// Builds the index in memory. Unreadable files are logged and left out.
    pub fn build(&self) -> Result<FileIndex> {
        let root = &self.settings.root;
        let files_root = root.join(&self.settings.files_dir);
        let mut paths = Vec::new();

        if files_root.is_dir() {
            walk_files(&files_root, &mut paths);
            paths.sort();
        } else {
            tracing::info!("[index] {} not found; no files indexed", files_root.display());
        }

        let mut files = Vec::with_capacity(paths.len() + 1);
        for path in &paths {
            match entry_for(root, path) {
                Ok(entry) => {
                    tracing::debug!("[index] {} {} bytes", entry.path, entry.size);
                    files.push(entry);
                }
                Err(e) => tracing::warn!("[skip] {}: {}", path.display(), e),
            }
        }

        if let Some(bundle) = &self.settings.bundle {
            let bundle_path = root.join(bundle);
            if bundle_path.is_file() {
                match entry_for(root, &bundle_path) {
                    Ok(entry) => files.push(entry),
                    Err(e) => tracing::warn!("[skip] {}: {}", bundle_path.display(), e),
                }
            }
        }

        Ok(FileIndex {
            generated: true,
            files,
        })
    }

    /// Builds the index and overwrites the output file.
    pub fn write(&self) -> Result<FileIndex> {
        let index = self.build()?;
        let json = serde_json::to_string_pretty(&index)?;
        write_text(&self.settings.output_path(), &json)?;
        tracing::info!("[index] wrote {} entries", index.files.len());
        Ok(index)
    }
}
