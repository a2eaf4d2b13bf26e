use crate::domain::model::ExclusionRules;
use crate::utils::error::{ReleaseError, Result};
use crate::utils::fs::to_posix;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub path: PathBuf,
    /// Entry names in the order they were written.
    pub entries: Vec<String>,
}

/// Writes a plugin tree into an installer-ready ZIP.
pub struct ArchiveBuilder<'a> {
    root: &'a Path,
    slug: &'a str,
    rules: &'a ExclusionRules,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new(root: &'a Path, slug: &'a str, rules: &'a ExclusionRules) -> Self {
        Self { root, slug, rules }
    }

    /// Relative paths of every file that survives the exclusion rules, sorted.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(ReleaseError::MissingInput {
                what: "plugin directory".to_string(),
                path: self.root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        self.walk(self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            // symlinked directories are not descended; symlinked files are packed
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                if self.rules.excludes_dir(&name) {
                    tracing::debug!("Pruned directory {}", path.display());
                    continue;
                }
                self.walk(&path, files)?;
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                if self.rules.excludes_file(&name) {
                    tracing::debug!("Skipped file {}", path.display());
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(self.root) {
                    files.push(rel.to_path_buf());
                }
            }
        }
        Ok(())
    }

    pub fn entry_name(&self, rel: &Path) -> String {
        format!("{}/{}", self.slug, to_posix(rel))
    }

    /// Builds the archive at `dest`. Nothing is written when the plugin root is missing.
    pub fn build(&self, dest: &Path) -> Result<ArchiveReport> {
        let files = self.collect()?;

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        tracing::debug!("Creating ZIP file with {} files", files.len());

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
        let mut entries = Vec::with_capacity(files.len());

        for rel in &files {
            let name = self.entry_name(rel);
            zip.start_file(name.as_str(), options)?;
            let mut source = File::open(self.root.join(rel))?;
            io::copy(&mut source, &mut zip)?;
            entries.push(name);
        }

        let mut writer = zip.finish()?;
        writer.flush()?;

        Ok(ArchiveReport {
            path: dest.to_path_buf(),
            entries,
        })
    }
}

/// Slug used as the archive's top-level directory: the plugin directory's name.
pub fn slug_from_dir(plugin_dir: &Path) -> Option<String> {
    plugin_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}
