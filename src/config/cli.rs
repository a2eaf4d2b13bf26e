use crate::config::Toggles;
use crate::core::fetcher::FetchSettings;
use crate::core::manifest::IndexSettings;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_slug, validate_url, Validate};
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Toggles follow the `EXCLUDE_MU=1` style environment convention:
/// only `1` turns a step on, anything else turns it off.
pub fn parse_toggle(value: &str) -> std::result::Result<bool, std::convert::Infallible> {
    Ok(value.trim() == "1")
}

#[derive(Debug, Clone, Parser)]
#[command(name = "wp-release")]
#[command(about = "Build a WordPress plugin release: version, changelog, readme and ZIP")]
pub struct ReleaseArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Plugin directory, relative to the root
    #[arg(long)]
    pub plugin_dir: Option<PathBuf>,

    /// Path to an optional release TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Exclude MU/testing directories from the ZIP
    #[arg(long, env = "EXCLUDE_MU", default_value = "1", value_parser = parse_toggle, action = ArgAction::Set)]
    pub exclude_mu: bool,

    /// Compile changelog.d/unreleased into CHANGELOG.md
    #[arg(long, env = "BUILD_CHANGELOG", default_value = "1", value_parser = parse_toggle, action = ArgAction::Set)]
    pub build_changelog: bool,

    /// Update the readme Stable tag and changelog block
    #[arg(long, env = "UPDATE_README", default_value = "1", value_parser = parse_toggle, action = ArgAction::Set)]
    pub update_readme: bool,

    /// Create a git tag v<version> after building
    #[arg(long, env = "TAG", default_value = "0", value_parser = parse_toggle, action = ArgAction::Set)]
    pub tag: bool,

    /// Release date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Show what would be built without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON logs
    #[arg(long)]
    pub log_json: bool,
}

impl ReleaseArgs {
    pub fn toggles(&self) -> Toggles {
        Toggles {
            exclude_mu: self.exclude_mu,
            build_changelog: self.build_changelog,
            update_readme: self.update_readme,
            tag: self.tag,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build_zip")]
#[command(about = "Build a WordPress-friendly plugin ZIP and print its manifest")]
pub struct ZipArgs {
    /// Plugin directory, relative to the root
    #[arg(default_value = "order-sentinel")]
    pub plugin_dir: PathBuf,

    /// Version for the artifact name; read from the plugin header when omitted
    pub version: Option<String>,

    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    #[arg(long, default_value = "OrderSentinel")]
    pub artifact_prefix: String,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "build_index")]
#[command(about = "Write index.json with SHA-256 digests of the public files")]
pub struct IndexArgs {
    #[arg(long, default_value = "public")]
    pub root: PathBuf,

    #[arg(long, default_value = "files")]
    pub files_dir: String,

    #[arg(long, default_value = "bundle/ordersentinel-code.tar.gz")]
    pub bundle: String,

    /// Do not index the bundle archive
    #[arg(long)]
    pub no_bundle: bool,

    #[arg(long, default_value = "index.json")]
    pub output: String,

    #[arg(short, long)]
    pub verbose: bool,
}

impl IndexArgs {
    pub fn settings(&self) -> IndexSettings {
        IndexSettings {
            root: self.root.clone(),
            files_dir: self.files_dir.clone(),
            bundle: (!self.no_bundle).then(|| self.bundle.clone()),
            output: self.output.clone(),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pull_tickets")]
#[command(about = "Pull docs and tickets for a project from the memory repository")]
pub struct FetchArgs {
    /// Raw base URL of the memory repo root, e.g. https://raw.githubusercontent.com/<user>/<repo>/main
    #[arg(long)]
    pub memory_base: String,

    /// Project name as in .greg/project-index.json
    #[arg(long, default_value = "OrderSentinel")]
    pub project_name: String,

    /// Project repo URL to match
    #[arg(long, default_value = "https://github.com/meloyelo51/wp-ordersentinel")]
    pub project_repo: String,

    /// Destination root (e.g. public/projects/order-sentinel)
    #[arg(long)]
    pub dest: PathBuf,

    /// Slug used when the project index has no match
    #[arg(long, default_value = "order-sentinel")]
    pub fallback_slug: String,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub log_json: bool,
}

impl FetchArgs {
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            memory_base: self.memory_base.clone(),
            project_name: self.project_name.clone(),
            project_repo: self.project_repo.clone(),
            fallback_slug: self.fallback_slug.clone(),
        }
    }
}

impl Validate for FetchArgs {
    fn validate(&self) -> Result<()> {
        validate_url("memory_base", &self.memory_base)?;
        validate_path("dest", &self.dest.to_string_lossy())?;
        validate_slug("fallback_slug", &self.fallback_slug)?;
        Ok(())
    }
}
