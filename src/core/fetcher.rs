use crate::domain::model::{
    DocsManifest, FetchKind, FetchRecord, FetchReport, FetchStatus, ProjectIndex, ProjectManifest,
    TicketsManifest,
};
use crate::domain::ports::{RemoteSource, Storage};
use crate::utils::error::Result;
use crate::utils::fs::is_safe_relative;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub const EXPORT_FILE: &str = "all_tickets_export.md";
const EMPTY_EXPORT: &str = "# (no tickets found in memory repo manifest)\n";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Raw base URL of the memory repository root.
    pub memory_base: String,
    pub project_name: String,
    pub project_repo: String,
    pub fallback_slug: String,
}

impl FetchSettings {
    pub fn new(memory_base: impl Into<String>) -> Self {
        Self {
            memory_base: memory_base.into(),
            project_name: "OrderSentinel".to_string(),
            project_repo: "https://github.com/meloyelo51/wp-ordersentinel".to_string(),
            fallback_slug: "order-sentinel".to_string(),
        }
    }

    fn base(&self) -> &str {
        self.memory_base.trim_end_matches('/')
    }
}

/// Pulls docs and tickets for one project from the memory repository into
/// `storage`, then writes the combined ticket export.
pub struct RemoteFetcher<R: RemoteSource, S: Storage> {
    source: R,
    storage: S,
    settings: FetchSettings,
}

impl<R: RemoteSource, S: Storage> RemoteFetcher<R, S> {
    pub fn new(source: R, storage: S, settings: FetchSettings) -> Self {
        Self {
            source,
            storage,
            settings,
        }
    }

    pub async fn run(&self) -> Result<FetchReport> {
        let base = self.settings.base().to_string();
        let mut report = FetchReport::default();

        // 1) 專案索引 -> slug
        let index: ProjectIndex = self
            .get_json(
                &format!("{}/.greg/project-index.json", base),
                FetchKind::ProjectIndex,
                &mut report.records,
            )
            .await
            .unwrap_or_default();

        match self.pick_slug(&index) {
            Some(slug) => {
                report.slug = slug;
                report.slug_from_index = true;
            }
            None => {
                report.slug = self.settings.fallback_slug.clone();
                tracing::warn!(
                    "[warn] could not derive slug from project index; using fallback '{}'",
                    report.slug
                );
            }
        }
        let slug = report.slug.clone();
        let project_base = format!("{}/projects/{}", base, slug);

        // 2) 專案層級 manifest
        let project: ProjectManifest = self
            .get_json(
                &format!("{}/_manifest.json", project_base),
                FetchKind::Manifest,
                &mut report.records,
            )
            .await
            .unwrap_or_default();
        let docs_manifest_path = project
            .docs_manifest
            .unwrap_or_else(|| format!("projects/{}/docs/_manifest.json", slug));
        let tickets_manifest_path = project
            .tickets_manifest
            .unwrap_or_else(|| format!("projects/{}/tickets/_manifest.json", slug));

        // 3) docs: roadmap + extra docs
        let docs: DocsManifest = self
            .get_json(
                &format!("{}/{}", base, docs_manifest_path.trim_start_matches('/')),
                FetchKind::Manifest,
                &mut report.records,
            )
            .await
            .unwrap_or_default();
        for name in docs.roadmap.iter().chain(docs.extra_docs.iter()) {
            let record = self
                .fetch_file(&project_base, "docs", name, FetchKind::Doc)
                .await;
            report.records.push(record);
        }

        // 4) tickets
        let tickets: TicketsManifest = self
            .get_json(
                &format!("{}/{}", base, tickets_manifest_path.trim_start_matches('/')),
                FetchKind::Manifest,
                &mut report.records,
            )
            .await
            .unwrap_or_default();
        for name in &tickets.tickets {
            let record = self
                .fetch_file(&project_base, "tickets", name, FetchKind::Ticket)
                .await;
            report.records.push(record);
        }

        // 5) 合併匯出（一定會寫）
        report.exported_tickets = self.write_export().await?;
        report.export_path = PathBuf::from(EXPORT_FILE);

        Ok(report)
    }

    fn pick_slug(&self, index: &ProjectIndex) -> Option<String> {
        let chosen = index
            .projects
            .iter()
            .find(|p| p.repo.as_deref() == Some(self.settings.project_repo.as_str()))
            .or_else(|| {
                index
                    .projects
                    .iter()
                    .find(|p| p.name.as_deref() == Some(self.settings.project_name.as_str()))
            })?;
        chosen.slug()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        kind: FetchKind,
        records: &mut Vec<FetchRecord>,
    ) -> Option<T> {
        let outcome = match self.source.get(url).await {
            Ok(bytes) => serde_json::from_slice::<T>(&bytes)
                .map(|value| (value, bytes.len()))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok((value, bytes)) => {
                tracing::debug!("[json] {} ({} bytes)", url, bytes);
                records.push(FetchRecord {
                    url: url.to_string(),
                    kind,
                    status: FetchStatus::Fetched { bytes, dest: None },
                });
                Some(value)
            }
            Err(reason) => {
                tracing::warn!("[warn] cannot read JSON {}: {}", url, reason);
                records.push(FetchRecord {
                    url: url.to_string(),
                    kind,
                    status: FetchStatus::Failed { reason },
                });
                None
            }
        }
    }

    async fn fetch_file(&self, project_base: &str, dir: &str, name: &str, kind: FetchKind) -> FetchRecord {
        let url = format!("{}/{}/{}", project_base, dir, name);

        if !is_safe_relative(name) {
            tracing::warn!("[skip] {} (unsafe file name)", url);
            return FetchRecord {
                url,
                kind,
                status: FetchStatus::Failed {
                    reason: format!("unsafe file name '{}'", name),
                },
            };
        }

        let dest = format!("{}/{}", dir, name);
        let result = match self.source.get(&url).await {
            Ok(bytes) => self
                .storage
                .write_file(&dest, &bytes)
                .await
                .map(|_| bytes.len()),
            Err(e) => Err(e),
        };

        let status = match result {
            Ok(bytes) => {
                tracing::info!("[pull] {} -> {}", url, dest);
                FetchStatus::Fetched {
                    bytes,
                    dest: Some(PathBuf::from(&dest)),
                }
            }
            Err(e) => {
                tracing::warn!("[skip] {} ({})", url, e);
                FetchStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        FetchRecord { url, kind, status }
    }

    /// Concatenates every `tickets/*.md` in name order into the export file.
    async fn write_export(&self) -> Result<usize> {
        let mut export = String::new();
        let mut count = 0;

        for name in self.storage.list_files("tickets").await? {
            if !name.ends_with(".md") {
                continue;
            }
            let bytes = self.storage.read_file(&format!("tickets/{}", name)).await?;
            export.push_str(&format!("\n\n# ===== {} =====\n", name));
            export.push_str(&String::from_utf8_lossy(&bytes));
            count += 1;
        }

        if count == 0 {
            export = EMPTY_EXPORT.to_string();
        }

        self.storage.write_file(EXPORT_FILE, export.as_bytes()).await?;
        tracing::info!("[write] {} ({} ticket(s))", EXPORT_FILE, count);
        Ok(count)
    }
}
