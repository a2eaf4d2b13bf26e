use crate::core::document::LineDocument;
use crate::domain::model::Version;
use crate::utils::error::Result;
use crate::utils::fs::{read_lossy, write_text};
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use std::path::Path;

const UPDATE_NOTE: &str = "* Update: See CHANGELOG.md for details.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadmeOutcome {
    pub skipped: bool,
    pub stable_tag_updated: bool,
    pub block_inserted: bool,
}

impl ReadmeOutcome {
    pub fn changed(&self) -> bool {
        self.stable_tag_updated || self.block_inserted
    }
}

fn version_block(version: &Version, date: NaiveDate) -> Vec<String> {
    vec![
        format!("= {} = ({})", version, date.format("%Y-%m-%d")),
        UPDATE_NOTE.to_string(),
        String::new(),
    ]
}

/// Points the first `Stable tag:` line at `version`. Returns whether the line changed.
pub fn set_stable_tag(doc: &mut LineDocument, version: &Version) -> Result<bool> {
    let re = RegexBuilder::new(r"^(Stable tag:\s*)\S+(\s*)$")
        .case_insensitive(true)
        .build()?;

    let Some(idx) = doc.position(&re) else {
        return Ok(false);
    };
    let current = doc.lines()[idx].clone();
    let updated = re
        .replace(&current, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], version, &caps[2])
        })
        .into_owned();

    if updated == current {
        return Ok(false);
    }
    doc.replace_line(idx, updated);
    Ok(true)
}

/// Adds the `= <version> = (<date>)` block under `== Changelog ==` unless it exists.
pub fn insert_version_block(doc: &mut LineDocument, version: &Version, date: NaiveDate) -> Result<bool> {
    let heading = Regex::new(r"^==\s*Changelog\s*==\s*$")?;

    match doc.position(&heading) {
        None => {
            doc.trim_end();
            let mut block = Vec::new();
            if !doc.is_empty() {
                block.push(String::new());
            }
            block.push("== Changelog ==".to_string());
            block.extend(version_block(version, date));
            doc.push_lines(block);
            doc.set_trailing_newline(true);
            Ok(true)
        }
        Some(h) => {
            let existing = Regex::new(&format!(r"^=\s*{}\s*=", regex::escape(version.as_str())))?;
            if doc.contains_match(&existing) {
                return Ok(false);
            }
            doc.insert_lines(h + 1, version_block(version, date));
            Ok(true)
        }
    }
}

pub fn update_readme(path: &Path, version: &Version, date: NaiveDate) -> Result<ReadmeOutcome> {
    if !path.exists() {
        tracing::info!("[skip] no readme found at {} (ok)", path.display());
        return Ok(ReadmeOutcome {
            skipped: true,
            ..Default::default()
        });
    }

    let mut doc = LineDocument::parse(&read_lossy(path)?);
    let outcome = ReadmeOutcome {
        skipped: false,
        stable_tag_updated: set_stable_tag(&mut doc, version)?,
        block_inserted: insert_version_block(&mut doc, version, date)?,
    };

    if outcome.changed() {
        write_text(path, &doc.render())?;
        tracing::info!(
            "[write] {} updated (Stable tag + version block)",
            path.display()
        );
    } else {
        tracing::info!("[ok ] {} already at {}", path.display(), version);
    }

    Ok(outcome)
}
