use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Version string captured from a plugin header or constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(String);

impl Version {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory, file name and suffix rules applied while walking a plugin tree.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    pub dirs: BTreeSet<String>,
    pub mu_dirs: BTreeSet<String>,
    pub exclude_mu: bool,
    pub files: BTreeSet<String>,
    pub suffixes: Vec<String>,
}

const RELEASE_DIRS: &[&str] = &[
    ".git",
    ".github",
    ".vscode",
    "__pycache__",
    "node_modules",
    "dist",
    "dist-old",
    "old",
    "tmp",
    "temp",
    "tests",
    "examples",
    "sample",
    "sandbox",
];
const MU_DIRS: &[&str] = &["mu", "mu-plugins", "mu_plugins", "muplugins", "sentinels"];
const RELEASE_SUFFIXES: &[&str] = &[".ps1", ".sh~", ".bak", ".tmp", ".swp", ".DS_Store"];
const JUNK_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

impl ExclusionRules {
    /// Rules used by the release pipeline.
    pub fn release(exclude_mu: bool) -> Self {
        Self {
            dirs: set_of(RELEASE_DIRS),
            mu_dirs: set_of(MU_DIRS),
            exclude_mu,
            files: JUNK_FILES.iter().map(|s| s.to_string()).collect(),
            suffixes: RELEASE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Rules used by the quick ZIP builder.
    pub fn minimal() -> Self {
        Self {
            dirs: set_of(&[".git", "node_modules", "vendor"]),
            mu_dirs: BTreeSet::new(),
            exclude_mu: false,
            files: JUNK_FILES.iter().map(|s| s.to_string()).collect(),
            suffixes: Vec::new(),
        }
    }

    pub fn with_extra(
        mut self,
        dirs: &[String],
        files: &[String],
        suffixes: &[String],
    ) -> Self {
        self.dirs.extend(dirs.iter().map(|d| d.to_lowercase()));
        self.files.extend(files.iter().cloned());
        self.suffixes.extend(suffixes.iter().cloned());
        self
    }

    pub fn excludes_dir(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.dirs.contains(&name) || (self.exclude_mu && self.mu_dirs.contains(&name))
    }

    pub fn excludes_file(&self, name: &str) -> bool {
        self.files.contains(name) || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

/// Changelog categories in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Added,
    Changed,
    Improved,
    Fixed,
    Security,
    Deprecated,
    Removed,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Added,
        Category::Changed,
        Category::Improved,
        Category::Fixed,
        Category::Security,
        Category::Deprecated,
        Category::Removed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Added => "Added",
            Category::Changed => "Changed",
            Category::Improved => "Improved",
            Category::Fixed => "Fixed",
            Category::Security => "Security",
            Category::Deprecated => "Deprecated",
            Category::Removed => "Removed",
        }
    }

    /// Maps a fragment file name like `fixed-login.md` to its category.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| {
                lower
                    .strip_prefix(&c.label().to_lowercase())
                    .is_some_and(|rest| rest.starts_with('-'))
            })
            .unwrap_or(Category::Changed)
    }
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub path: PathBuf,
    pub file_name: String,
    pub category: Category,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub size: u64,
    pub sha256: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndex {
    pub generated: bool,
    pub files: Vec<ManifestEntry>,
}

// Remote memory repository contracts.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectIndex {
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

impl ProjectDescriptor {
    pub fn slug(&self) -> Option<String> {
        self.paths
            .first()
            .map(|p| p.trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub docs_manifest: Option<String>,
    #[serde(default)]
    pub tickets_manifest: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsManifest {
    #[serde(default)]
    pub roadmap: Vec<String>,
    #[serde(default)]
    pub extra_docs: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketsManifest {
    #[serde(default)]
    pub tickets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    ProjectIndex,
    Manifest,
    Doc,
    Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetched { bytes: usize, dest: Option<PathBuf> },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub url: String,
    pub kind: FetchKind,
    pub status: FetchStatus,
}

impl FetchRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Fetched { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub slug: String,
    pub slug_from_index: bool,
    pub records: Vec<FetchRecord>,
    pub export_path: PathBuf,
    pub exported_tickets: usize,
}

impl FetchReport {
    pub fn fetched(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FetchRecord> {
        self.records.iter().filter(|r| !r.is_success())
    }
}
