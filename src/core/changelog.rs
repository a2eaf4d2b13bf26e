use crate::core::document::LineDocument;
use crate::domain::model::{Category, Fragment, Version};
use crate::utils::error::{ReleaseError, Result};
use crate::utils::fs::{read_lossy, write_text};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CHANGELOG: &str =
    "# Changelog\n\nAll notable changes to this project are documented here.\n\n";

#[derive(Debug, Clone)]
pub struct ChangelogPaths {
    /// `CHANGELOG.md`
    pub changelog: PathBuf,
    /// `changelog.d`; released fragments go to `<fragments_dir>/<version>/`.
    pub fragments_dir: PathBuf,
    /// `changelog.d/unreleased`
    pub unreleased_dir: PathBuf,
}

impl ChangelogPaths {
    pub fn under(root: &Path) -> Self {
        let fragments_dir = root.join("changelog.d");
        Self {
            changelog: root.join("CHANGELOG.md"),
            unreleased_dir: fragments_dir.join("unreleased"),
            fragments_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    NoFragments,
    AlreadyPresent,
    Compiled {
        fragments: usize,
        archived: usize,
        skipped: usize,
    },
}

/// Unreleased `*.md` fragments in file-name order.
pub fn collect_fragments(unreleased_dir: &Path) -> Result<Vec<Fragment>> {
    if !unreleased_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut fragments = Vec::new();
    for entry in fs::read_dir(unreleased_dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !entry.file_type()?.is_file() || !file_name.ends_with(".md") {
            continue;
        }

        fragments.push(Fragment {
            category: Category::from_file_name(&file_name),
            body: read_lossy(&path)?,
            file_name,
            path,
        });
    }

    fragments.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(fragments)
}

/// Renders one release section as lines, ending with a blank line.
pub fn render_section(version: &Version, date: NaiveDate, fragments: &[Fragment]) -> Vec<String> {
    let mut grouped: BTreeMap<Category, Vec<&Fragment>> = BTreeMap::new();
    for fragment in fragments {
        grouped.entry(fragment.category).or_default().push(fragment);
    }

    let mut lines = vec![
        format!("## [{}] — {}", version, date.format("%Y-%m-%d")),
        String::new(),
    ];

    for category in Category::ALL {
        let Some(items) = grouped.get(&category) else {
            continue;
        };
        lines.push(format!("### {}", category.label()));
        lines.push(String::new());
        for fragment in items {
            lines.extend(fragment.body.trim_end().lines().map(str::to_string));
            lines.push(String::new());
        }
    }

    lines
}

pub fn has_section(doc: &LineDocument, version: &Version) -> Result<bool> {
    let re = Regex::new(&format!(r"^##\s*\[{}\]", regex::escape(version.as_str())))?;
    Ok(doc.contains_match(&re))
}

/// Inserts `section` directly under the `# Changelog` heading and the blank
/// lines after it, so any preamble text follows the new section. Without the
/// heading the section is prepended.
pub fn insert_section(doc: &mut LineDocument, section: Vec<String>) -> Result<()> {
    let heading = Regex::new(r"^#\s*Changelog\s*$")?;

    match doc.position(&heading) {
        Some(h) => {
            let mut at = h + 1;
            while at < doc.len() && doc.is_blank(at) {
                at += 1;
            }
            let mut block = Vec::with_capacity(section.len() + 1);
            if at == h + 1 {
                block.push(String::new());
            }
            block.extend(section);
            doc.insert_lines(at, block);
        }
        None => doc.insert_lines(0, section),
    }

    doc.trim_end();
    doc.set_trailing_newline(true);
    Ok(())
}

pub struct ChangelogCompiler<'a> {
    paths: &'a ChangelogPaths,
}

impl<'a> ChangelogCompiler<'a> {
    pub fn new(paths: &'a ChangelogPaths) -> Self {
        Self { paths }
    }

    pub fn compile(&self, version: &Version, date: NaiveDate) -> Result<CompileOutcome> {
        let fragments = collect_fragments(&self.paths.unreleased_dir)?;
        if fragments.is_empty() {
            tracing::info!("[info] no unreleased fragments; skipping changelog compile");
            return Ok(CompileOutcome::NoFragments);
        }

        let previous = if self.paths.changelog.exists() {
            Some(read_lossy(&self.paths.changelog)?)
        } else {
            None
        };
        let mut doc = LineDocument::parse(previous.as_deref().unwrap_or(DEFAULT_CHANGELOG));

        if has_section(&doc, version)? {
            tracing::info!("[ok ] CHANGELOG already has {}", version);
            tracing::warn!(
                "{} fragment(s) left in {} for the next version",
                fragments.len(),
                self.paths.unreleased_dir.display()
            );
            return Ok(CompileOutcome::AlreadyPresent);
        }

        insert_section(&mut doc, render_section(version, date, &fragments))?;
        write_text(&self.paths.changelog, &doc.render())?;
        tracing::info!(
            "[write] {} <- compiled {} fragment(s)",
            self.paths.changelog.display(),
            fragments.len()
        );

        let release_dir = self.paths.fragments_dir.join(version.as_str());
        match archive_fragments(&fragments, &release_dir) {
            Ok((archived, skipped)) => {
                tracing::info!(
                    "[move] archived {} fragment(s) -> {}",
                    archived,
                    release_dir.display()
                );
                Ok(CompileOutcome::Compiled {
                    fragments: fragments.len(),
                    archived,
                    skipped,
                })
            }
            Err(e) => {
                self.restore(previous.as_deref())?;
                Err(ReleaseError::Rollback {
                    message: e.to_string(),
                })
            }
        }
    }

    fn restore(&self, previous: Option<&str>) -> Result<()> {
        match previous {
            Some(text) => write_text(&self.paths.changelog, text),
            None => {
                fs::remove_file(&self.paths.changelog)?;
                Ok(())
            }
        }
    }
}

/// Moves fragments into `release_dir`. On failure, already moved fragments
/// are moved back before the error is returned.
pub fn archive_fragments(fragments: &[Fragment], release_dir: &Path) -> Result<(usize, usize)> {
    fs::create_dir_all(release_dir)?;

    let mut moved: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut skipped = 0;

    for fragment in fragments {
        let dest = release_dir.join(&fragment.file_name);
        if dest.exists() {
            tracing::warn!(
                "[skip] {} already archived; leaving {} in place",
                dest.display(),
                fragment.path.display()
            );
            skipped += 1;
            continue;
        }

        if let Err(e) = fs::rename(&fragment.path, &dest) {
            for (from, to) in moved.iter().rev() {
                if let Err(undo) = fs::rename(to, from) {
                    tracing::error!("Could not restore {}: {}", from.display(), undo);
                }
            }
            return Err(e.into());
        }
        moved.push((fragment.path.clone(), dest));
    }

    Ok((moved.len(), skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn fragment(name: &str, body: &str) -> Fragment {
        Fragment {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            category: Category::from_file_name(name),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_render_section_category_order() {
        let fragments = vec![
            fragment("added-x.md", "- x\n"),
            fragment("fixed-y.md", "- y"),
            fragment("z.md", "- z\n\n"),
        ];

        let lines = render_section(&Version::new("1.2.0"), date(), &fragments);

        assert_eq!(
            lines.join("\n"),
            "## [1.2.0] — 2026-10-17\n\n### Added\n\n- x\n\n### Changed\n\n- z\n\n### Fixed\n\n- y\n"
        );
    }

    #[test]
    fn test_insert_under_heading_keeps_preamble() {
        let mut doc = LineDocument::parse(
            "# Changelog\n\nAll notable changes.\n\n## [1.0.0] — 2026-01-01\n\n### Added\n\n- first\n",
        );
        let section = render_section(&Version::new("1.1.0"), date(), &[fragment("fixed-a.md", "- a")]);

        insert_section(&mut doc, section).unwrap();

        assert_eq!(
            doc.render(),
            "# Changelog\n\n## [1.1.0] — 2026-10-17\n\n### Fixed\n\n- a\n\nAll notable changes.\n\n## [1.0.0] — 2026-01-01\n\n### Added\n\n- first\n"
        );
    }

    #[test]
    fn test_insert_with_preamble_only_stays_on_top() {
        let mut doc = LineDocument::parse("# Changelog\nNotes about releases.\nMore notes.\n");
        let section = render_section(&Version::new("0.3.0"), date(), &[fragment("added-b.md", "- b")]);

        insert_section(&mut doc, section).unwrap();

        assert_eq!(
            doc.render(),
            "# Changelog\n\n## [0.3.0] — 2026-10-17\n\n### Added\n\n- b\n\nNotes about releases.\nMore notes.\n"
        );
    }

    #[test]
    fn test_insert_without_heading_prepends() {
        let mut doc = LineDocument::parse("Some notes\n");
        let section = render_section(&Version::new("0.2.0"), date(), &[fragment("a.md", "- a")]);

        insert_section(&mut doc, section).unwrap();

        assert!(doc.render().starts_with("## [0.2.0] — 2026-10-17\n"));
        assert!(doc.render().ends_with("\nSome notes\n"));
    }

    #[test]
    fn test_has_section_escapes_version() {
        let doc = LineDocument::parse("## [1.0.0] — 2026-01-01\n");
        assert!(has_section(&doc, &Version::new("1.0.0")).unwrap());
        assert!(!has_section(&doc, &Version::new("1.0")).unwrap());
        assert!(!has_section(&doc, &Version::new("1x0x0")).unwrap());
    }

    #[test]
    fn test_compile_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let paths = ChangelogPaths::under(dir.path());
        fs::create_dir_all(&paths.unreleased_dir).unwrap();
        fs::write(paths.unreleased_dir.join("added-x.md"), "- x").unwrap();
        fs::write(paths.unreleased_dir.join("notes.txt"), "ignored").unwrap();

        let compiler = ChangelogCompiler::new(&paths);
        let version = Version::new("1.0.0");

        let first = compiler.compile(&version, date()).unwrap();
        assert_eq!(
            first,
            CompileOutcome::Compiled {
                fragments: 1,
                archived: 1,
                skipped: 0
            }
        );
        assert!(paths.fragments_dir.join("1.0.0/added-x.md").exists());
        assert!(paths.unreleased_dir.join("notes.txt").exists());

        let text = fs::read_to_string(&paths.changelog).unwrap();
        assert!(text.starts_with("# Changelog\n\n## [1.0.0] — 2026-10-17\n"));
        assert!(text.ends_with("- x\n\nAll notable changes to this project are documented here.\n"));
        assert_eq!(text.matches("## [1.0.0]").count(), 1);

        let second = compiler.compile(&version, date()).unwrap();
        assert_eq!(second, CompileOutcome::NoFragments);
        assert_eq!(fs::read_to_string(&paths.changelog).unwrap(), text);
    }

    #[test]
    fn test_existing_section_leaves_fragments() {
        let dir = TempDir::new().unwrap();
        let paths = ChangelogPaths::under(dir.path());
        fs::create_dir_all(&paths.unreleased_dir).unwrap();
        fs::write(&paths.changelog, "# Changelog\n\n## [1.0.0] — 2026-01-01\n").unwrap();
        fs::write(paths.unreleased_dir.join("fixed-late.md"), "- late").unwrap();

        let outcome = ChangelogCompiler::new(&paths)
            .compile(&Version::new("1.0.0"), date())
            .unwrap();

        assert_eq!(outcome, CompileOutcome::AlreadyPresent);
        assert!(paths.unreleased_dir.join("fixed-late.md").exists());
    }

    fn blocked_release_dir(dir: &TempDir) -> ChangelogPaths {
        let paths = ChangelogPaths::under(dir.path());
        fs::create_dir_all(&paths.unreleased_dir).unwrap();
        fs::write(paths.unreleased_dir.join("fixed-nonce.md"), "- nonce").unwrap();
        // a plain file where the release directory should go
        fs::write(paths.fragments_dir.join("1.0.0"), "").unwrap();
        paths
    }

    #[test]
    fn test_failed_archive_restores_existing_changelog() {
        let dir = TempDir::new().unwrap();
        let paths = blocked_release_dir(&dir);
        fs::write(&paths.changelog, "# Changelog\n\nPre.\n").unwrap();

        let err = ChangelogCompiler::new(&paths)
            .compile(&Version::new("1.0.0"), date())
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Rollback { .. }));
        assert_eq!(
            fs::read_to_string(&paths.changelog).unwrap(),
            "# Changelog\n\nPre.\n"
        );
        assert!(paths.unreleased_dir.join("fixed-nonce.md").exists());
    }

    #[test]
    fn test_failed_archive_removes_new_changelog() {
        let dir = TempDir::new().unwrap();
        let paths = blocked_release_dir(&dir);

        let err = ChangelogCompiler::new(&paths)
            .compile(&Version::new("1.0.0"), date())
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Rollback { .. }));
        assert!(!paths.changelog.exists());
        assert!(paths.unreleased_dir.join("fixed-nonce.md").exists());
    }

    #[test]
    fn test_archive_skips_existing_destination() {
        let dir = TempDir::new().unwrap();
        let release_dir = dir.path().join("1.0.0");
        fs::create_dir_all(&release_dir).unwrap();
        fs::write(release_dir.join("a.md"), "old").unwrap();

        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let fragments = vec![
            Fragment { path: a.clone(), file_name: "a.md".into(), category: Category::Changed, body: "a".into() },
            Fragment { path: b.clone(), file_name: "b.md".into(), category: Category::Changed, body: "b".into() },
        ];

        let (archived, skipped) = archive_fragments(&fragments, &release_dir).unwrap();

        assert_eq!((archived, skipped), (1, 1));
        assert!(a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_archive_failure_rolls_back_moves() {
        let dir = TempDir::new().unwrap();
        let release_dir = dir.path().join("1.0.0");
        let a = dir.path().join("a.md");
        fs::write(&a, "a").unwrap();
        let fragments = vec![
            Fragment { path: a.clone(), file_name: "a.md".into(), category: Category::Changed, body: "a".into() },
            Fragment {
                path: dir.path().join("gone.md"),
                file_name: "gone.md".into(),
                category: Category::Changed,
                body: String::new(),
            },
        ];

        assert!(archive_fragments(&fragments, &release_dir).is_err());
        assert!(a.exists());
        assert!(!release_dir.join("a.md").exists());
    }
}
