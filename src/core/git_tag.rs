use crate::domain::model::Version;
use crate::utils::error::{ReleaseError, Result};
use std::path::Path;
use std::process::Command;

pub fn tag_name(version: &Version) -> String {
    format!("v{}", version)
}

fn git(repo: &Path, args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .map_err(|e| ReleaseError::Git {
            command: args.join(" "),
            message: e.to_string(),
        })?;
    Ok(output)
}

fn git_checked(repo: &Path, args: &[&str]) -> Result<()> {
    let output = git(repo, args)?;
    if !output.status.success() {
        return Err(ReleaseError::Git {
            command: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Stages everything, commits and creates an annotated `v<version>` tag.
/// A failing commit (e.g. nothing to commit) does not stop the tag.
pub fn create_release_tag(repo: &Path, version: &Version) -> Result<String> {
    let tag = tag_name(version);

    git_checked(repo, &["add", "-A"])?;

    let message = format!("release: {} (dist only)", version);
    let commit = git(repo, &["commit", "-m", &message])?;
    if !commit.status.success() {
        tracing::debug!(
            "git commit exited with {}: {}",
            commit.status,
            String::from_utf8_lossy(&commit.stdout).trim()
        );
    }

    let annotation = format!("Release {}", version);
    git_checked(repo, &["tag", "-a", &tag, "-m", &annotation])?;
    tracing::info!("[tag ] created tag {} (push with: git push && git push --tags)", tag);
    Ok(tag)
}
