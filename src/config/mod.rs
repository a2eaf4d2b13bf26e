#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::archive::slug_from_dir;
use crate::core::changelog::ChangelogPaths;
use crate::domain::model::{ExclusionRules, Version};
use crate::utils::error::{ReleaseError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_slug, Validate};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use toml_config::ReleaseToml;

pub const DEFAULT_PLUGIN_DIR: &str = "order-sentinel";
pub const DEFAULT_ARTIFACT_PREFIX: &str = "OrderSentinel";

/// Process toggles, normally from `EXCLUDE_MU`, `BUILD_CHANGELOG`,
/// `UPDATE_README` and `TAG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggles {
    pub exclude_mu: bool,
    pub build_changelog: bool,
    pub update_readme: bool,
    pub tag: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            exclude_mu: true,
            build_changelog: true,
            update_readme: true,
            tag: false,
        }
    }
}

/// Everything one release run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    pub root: PathBuf,
    pub plugin_dir: PathBuf,
    pub slug: String,
    pub bootstrap: PathBuf,
    pub readme: PathBuf,
    pub changelog: ChangelogPaths,
    pub dist_dir: PathBuf,
    pub artifact_prefix: String,
    pub rules: ExclusionRules,
    pub version_constants: Vec<String>,
    pub toggles: Toggles,
    pub date: NaiveDate,
}

impl ReleaseSettings {
    /// Layout used when no TOML file overrides it: `order-sentinel/` under `root`.
    pub fn new(root: impl Into<PathBuf>, toggles: Toggles, date: NaiveDate) -> Self {
        Self::resolve(root, None, toggles, date, &ReleaseToml::default())
    }

    pub fn resolve(
        root: impl Into<PathBuf>,
        plugin_dir: Option<PathBuf>,
        toggles: Toggles,
        date: NaiveDate,
        file: &ReleaseToml,
    ) -> Self {
        let root = root.into();
        let plugin_dir = plugin_dir
            .or_else(|| file.plugin.dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLUGIN_DIR));
        let plugin_dir = root.join(plugin_dir);

        let slug = file
            .plugin
            .slug
            .clone()
            .or_else(|| slug_from_dir(&plugin_dir))
            .unwrap_or_else(|| DEFAULT_PLUGIN_DIR.to_string());

        let bootstrap = match &file.plugin.bootstrap {
            Some(path) => root.join(path),
            None => plugin_dir.join(format!("{}.php", slug)),
        };
        let readme = match &file.paths.readme {
            Some(path) => root.join(path),
            None => plugin_dir.join("readme.txt"),
        };

        let mut changelog = ChangelogPaths::under(&root);
        if let Some(path) = &file.paths.changelog {
            changelog.changelog = root.join(path);
        }
        if let Some(dir) = &file.paths.fragments_dir {
            changelog.fragments_dir = root.join(dir);
            changelog.unreleased_dir = changelog.fragments_dir.join("unreleased");
        }

        let dist_dir = root.join(file.paths.dist.as_deref().unwrap_or("dist"));
        let rules = ExclusionRules::release(toggles.exclude_mu).with_extra(
            &file.exclude.dirs,
            &file.exclude.files,
            &file.exclude.suffixes,
        );

        Self {
            root,
            plugin_dir,
            slug,
            bootstrap,
            readme,
            changelog,
            dist_dir,
            artifact_prefix: file
                .plugin
                .artifact_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_ARTIFACT_PREFIX.to_string()),
            rules,
            version_constants: file.version.constants.clone(),
            toggles,
            date,
        }
    }

    /// `dist/<Prefix>-<version>.zip`
    pub fn artifact_path(&self, version: &Version) -> PathBuf {
        artifact_path(&self.dist_dir, &self.artifact_prefix, version)
    }
}

pub fn artifact_path(dist_dir: &Path, prefix: &str, version: &Version) -> PathBuf {
    dist_dir.join(format!("{}-{}.zip", prefix, version))
}

impl Validate for ReleaseSettings {
    fn validate(&self) -> Result<()> {
        validate_slug("slug", &self.slug)?;
        validate_non_empty_string("artifact_prefix", &self.artifact_prefix)?;
        if !self.plugin_dir.is_dir() {
            return Err(ReleaseError::MissingInput {
                what: "plugin directory".to_string(),
                path: self.plugin_dir.clone(),
            });
        }
        Ok(())
    }
}
