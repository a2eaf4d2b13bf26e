pub mod archive;
pub mod changelog;
pub mod document;
pub mod fetcher;
pub mod git_tag;
pub mod manifest;
pub mod readme;
pub mod release;
pub mod version;

pub use crate::domain::model::{ExclusionRules, Version};
pub use crate::domain::ports::{RemoteSource, Storage};
pub use crate::utils::error::Result;
