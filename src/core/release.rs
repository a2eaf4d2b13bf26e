use crate::config::ReleaseSettings;
use crate::core::archive::{ArchiveBuilder, ArchiveReport};
use crate::core::changelog::{collect_fragments, ChangelogCompiler, CompileOutcome};
use crate::core::git_tag::create_release_tag;
use crate::core::readme::{update_readme, ReadmeOutcome};
use crate::core::version::VersionResolver;
use crate::domain::model::Version;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version: Version,
    pub changelog: Option<CompileOutcome>,
    pub readme: Option<ReadmeOutcome>,
    pub archive: ArchiveReport,
    pub tag: Option<String>,
}

/// What a run would do, without touching the filesystem.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub version: Version,
    pub artifact: PathBuf,
    pub entries: Vec<String>,
    pub pending_fragments: usize,
}

/// Version → changelog → readme → ZIP → optional tag.
pub struct ReleaseEngine<'a> {
    settings: &'a ReleaseSettings,
}

impl<'a> ReleaseEngine<'a> {
    pub fn new(settings: &'a ReleaseSettings) -> Self {
        Self { settings }
    }

    pub fn resolve_version(&self) -> Result<Version> {
        VersionResolver::for_slug(&self.settings.slug)
            .with_constants(&self.settings.version_constants)
            .resolve(&self.settings.bootstrap)
    }

    pub fn plan(&self) -> Result<ReleasePlan> {
        self.settings.validate()?;
        let version = self.resolve_version()?;

        let builder = ArchiveBuilder::new(&self.settings.plugin_dir, &self.settings.slug, &self.settings.rules);
        let entries = builder
            .collect()?
            .iter()
            .map(|rel| builder.entry_name(rel))
            .collect();

        Ok(ReleasePlan {
            artifact: self.settings.artifact_path(&version),
            pending_fragments: collect_fragments(&self.settings.changelog.unreleased_dir)?.len(),
            version,
            entries,
        })
    }

    pub fn run(&self) -> Result<ReleaseReport> {
        let settings = self.settings;
        settings.validate()?;

        let version = self.resolve_version()?;
        tracing::info!("[info] Detected version: {}", version);

        let changelog = if settings.toggles.build_changelog {
            Some(ChangelogCompiler::new(&settings.changelog).compile(&version, settings.date)?)
        } else {
            tracing::info!("[skip] BUILD_CHANGELOG=0 -> changelog not compiled");
            None
        };

        let readme = if settings.toggles.update_readme {
            Some(update_readme(&settings.readme, &version, settings.date)?)
        } else {
            None
        };

        let artifact = settings.artifact_path(&version);
        let archive = ArchiveBuilder::new(&settings.plugin_dir, &settings.slug, &settings.rules)
            .build(&artifact)?;
        tracing::info!(
            "[zip ] {} ({} entries, EXCLUDE_MU={})",
            archive.path.display(),
            archive.entries.len(),
            if settings.toggles.exclude_mu { "1" } else { "0" }
        );

        let tag = if settings.toggles.tag {
            match create_release_tag(&settings.root, &version) {
                Ok(tag) => Some(tag),
                Err(e) => {
                    tracing::warn!("[warn] tagging failed: {}", e);
                    None
                }
            }
        } else {
            tracing::info!("[info] TAG=0 -> skipping tag");
            None
        };

        Ok(ReleaseReport {
            version,
            changelog,
            readme,
            archive,
            tag,
        })
    }
}
