pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{HttpSource, LocalStorage};
pub use config::{ReleaseSettings, Toggles};

#[cfg(feature = "cli")]
pub use config::cli::{FetchArgs, IndexArgs, ReleaseArgs, ZipArgs};

pub use crate::core::{
    archive::ArchiveBuilder, changelog::ChangelogCompiler, fetcher::RemoteFetcher,
    manifest::ManifestIndexer, release::ReleaseEngine, version::VersionResolver,
};
pub use utils::error::{ReleaseError, Result};
