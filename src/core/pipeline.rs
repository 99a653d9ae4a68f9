use crate::domain::model::{ExecutionMode, Item, ItemOutcome, OutputArtifact, OutputMode};
use crate::domain::ports::{AppSource, ConfigProvider, Storage};
use crate::utils::error::{ExportError, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// 已決定輸出檔名的 app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub item: Item,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub content: String,
}

/// 所有 app 都有結果之後的彙整（依清單順序）
#[derive(Debug, Default)]
pub struct ExportBatch {
    pub outcomes: Vec<ItemOutcome>,
    pub archive_entries: Vec<ArchiveEntry>,
    pub succeeded: usize,
    pub failed: usize,
}

struct Tally {
    total: usize,
    succeeded: usize,
    failed: usize,
}

impl Tally {
    fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Exported { file_name, .. } => {
                self.succeeded += 1;
                tracing::info!(
                    "✅ Exported ({}/{}): {}",
                    self.succeeded + self.failed,
                    self.total,
                    file_name
                );
            }
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

pub struct ExportPipeline<A: AppSource, S: Storage, C: ConfigProvider> {
    pub(crate) source: A,
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<A: AppSource, S: Storage, C: ConfigProvider> ExportPipeline<A, S, C> {
    pub fn new(source: A, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 逐頁取得所有 app。
    /// 某一頁失敗時停止翻頁，已取得的 app 照樣回傳，不重試。
    pub async fn list_all_items(&self) -> Vec<Item> {
        let page_size = self.config.page_size();
        let mut items = Vec::new();
        let mut page: u32 = 1;

        tracing::info!("🔍 Fetching app list (page size {})", page_size);

        loop {
            if page > self.config.max_pages() {
                tracing::warn!(
                    "⚠️ Stopped after {} pages; the server kept returning full pages",
                    self.config.max_pages()
                );
                break;
            }

            let batch = match self.source.list_page(page, page_size).await {
                Ok(batch) => batch,
                Err(e) => {
                    let e = match e {
                        e @ ExportError::ListPageFailed { .. } => e,
                        other => ExportError::ListPageFailed {
                            page,
                            reason: other.to_string(),
                        },
                    };
                    tracing::error!("❌ {}", e);
                    break;
                }
            };

            let count = batch.len();
            if count == 0 {
                break;
            }

            items.extend(batch);
            tracing::info!("✅ Fetched page {} with {} apps", page, count);

            if count < page_size {
                break;
            }
            page += 1;
        }

        items
    }

    /// 依清單順序決定每個 app 的檔名
    pub fn plan(&self, items: Vec<Item>, date: NaiveDate) -> Vec<PlannedItem> {
        let names = self.config.naming().plan(&items, date);
        items
            .into_iter()
            .zip(names)
            .map(|(item, file_name)| PlannedItem { item, file_name })
            .collect()
    }

    /// 匯出所有 app。每個 app 的失敗只影響自己，全部有結果後才回傳。
    pub async fn export_all(&self, planned: Vec<PlannedItem>) -> ExportBatch {
        let mut tally = Tally::new(planned.len());
        let mut results = Vec::with_capacity(planned.len());

        match self.config.execution_mode() {
            ExecutionMode::Sequential => {
                for (index, planned_item) in planned.into_iter().enumerate() {
                    let result = self.process(planned_item).await;
                    tally.record(&result.0);
                    results.push((index, result));
                }
            }
            ExecutionMode::Concurrent => {
                let limit = self.config.concurrent_requests().max(1);
                tracing::debug!("Exporting with up to {} concurrent requests", limit);

                let mut in_flight = stream::iter(planned.into_iter().enumerate().map(
                    |(index, planned_item)| async move { (index, self.process(planned_item).await) },
                ))
                .buffer_unordered(limit);

                while let Some((index, result)) = in_flight.next().await {
                    tally.record(&result.0);
                    results.push((index, result));
                }

                results.sort_by_key(|(index, _)| *index);
            }
        }

        let mut batch = ExportBatch {
            succeeded: tally.succeeded,
            failed: tally.failed,
            ..Default::default()
        };
        for (_, (outcome, entry)) in results {
            batch.outcomes.push(outcome);
            batch.archive_entries.extend(entry);
        }
        batch
    }

    async fn process(&self, planned: PlannedItem) -> (ItemOutcome, Option<ArchiveEntry>) {
        let PlannedItem { item, file_name } = planned;

        let payload = match self.source.export_item(&item).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    "❌ App [{}] ({}) failed: {}",
                    item.display_name(),
                    item.id,
                    e
                );
                let reason = e.to_string();
                return (ItemOutcome::Failed { item, reason }, None);
            }
        };

        match self.config.output_mode() {
            OutputMode::Files => {
                if let Err(e) = self
                    .storage
                    .write_file(&file_name, payload.content.as_bytes())
                    .await
                {
                    tracing::error!(
                        "❌ App [{}] ({}) could not be written to {}: {}",
                        item.display_name(),
                        item.id,
                        file_name,
                        e
                    );
                    let reason = format!("write failed: {}", e);
                    return (ItemOutcome::Failed { item, reason }, None);
                }
                (ItemOutcome::Exported { item, file_name }, None)
            }
            OutputMode::Archive => {
                let entry = ArchiveEntry {
                    file_name: file_name.clone(),
                    content: payload.content,
                };
                (ItemOutcome::Exported { item, file_name }, Some(entry))
            }
        }
    }

    pub fn output_location(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .display()
            .to_string()
    }

    /// 以不壓縮（Stored）的方式打包並寫出單一 zip
    pub async fn write_archive(
        &self,
        entries: Vec<ArchiveEntry>,
        date: NaiveDate,
    ) -> Result<OutputArtifact> {
        let archive_name = self.config.naming().archive_file_name(date);
        let exported: Vec<String> = entries.iter().map(|e| e.file_name.clone()).collect();

        tracing::info!("⏳ Building archive {} with {} files", archive_name, entries.len());

        let written = async {
            let zip_data = build_archive(&entries)?;
            tracing::debug!("Writing archive ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&archive_name, &zip_data).await
        }
        .await;

        match written {
            Ok(()) => Ok(OutputArtifact::Archive {
                path: self.output_location(&archive_name),
                entries: exported,
            }),
            Err(e) => {
                tracing::error!("❌ Archive {} could not be written: {}", archive_name, e);
                tracing::error!(
                    "📌 {} apps had been exported before the failure: {}",
                    exported.len(),
                    exported.join(", ")
                );
                Err(ExportError::ArchiveWriteFailed {
                    reason: e.to_string(),
                    exported,
                })
            }
        }
    }
}

fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for entry in entries {
        zip.start_file(entry.file_name.as_str(), options)?;
        zip.write_all(entry.content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
