use crate::adapters::{ConsoleClient, LocalStorage};
use crate::config::credentials::{CredentialChain, Credentials};
use crate::config::settings::ExportSettings;
use crate::core::pipeline::{ExportPipeline, PlannedItem};
use crate::domain::model::{ItemFailure, ItemOutcome, OutputArtifact, OutputMode, RunReport};
use crate::domain::ports::{AppSource, ConfigProvider, Storage};
use crate::utils::error::Result;
use crate::utils::naming;
use crate::utils::validation::Validate;
use chrono::NaiveDate;

pub struct ExportEngine<A: AppSource, S: Storage, C: ConfigProvider> {
    pipeline: ExportPipeline<A, S, C>,
}

impl<A: AppSource, S: Storage, C: ConfigProvider> ExportEngine<A, S, C> {
    pub fn new(pipeline: ExportPipeline<A, S, C>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ExportPipeline<A, S, C> {
        &self.pipeline
    }

    /// 以今天的日期執行
    pub async fn run(&self) -> Result<RunReport> {
        self.run_on(naming::today()).await
    }

    /// 列出 → 匯出（等待全部完成）→ 寫出 → 摘要
    pub async fn run_on(&self, date: NaiveDate) -> Result<RunReport> {
        let config = self.pipeline.config();
        tracing::info!("🚀 Starting Dify app export");
        tracing::info!("📅 Date stamp: {}", naming::date_stamp(date));

        let items = self.pipeline.list_all_items().await;
        if items.is_empty() {
            tracing::error!("❌ No apps found, nothing to export");
            let report = RunReport::default();
            log_summary(&report);
            return Ok(report);
        }

        tracing::info!("🎉 Found {} apps, starting export...", items.len());

        let planned = self.pipeline.plan(items, date);
        let attempted = planned.len();
        let batch = self.pipeline.export_all(planned).await;

        let artifact = match config.output_mode() {
            OutputMode::Files => {
                let paths: Vec<String> = batch
                    .outcomes
                    .iter()
                    .filter_map(|outcome| match outcome {
                        ItemOutcome::Exported { file_name, .. } => {
                            Some(self.pipeline.output_location(file_name))
                        }
                        ItemOutcome::Failed { .. } => None,
                    })
                    .collect();
                (!paths.is_empty()).then_some(OutputArtifact::Files { paths })
            }
            OutputMode::Archive if batch.archive_entries.is_empty() => {
                tracing::warn!("⚠️ No app was exported, skipping the archive");
                None
            }
            OutputMode::Archive => Some(
                self.pipeline
                    .write_archive(batch.archive_entries, date)
                    .await?,
            ),
        };

        let failures = batch
            .outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Failed { item, reason } => Some(ItemFailure {
                    name: item.display_name(),
                    item_id: item.id,
                    reason,
                }),
                ItemOutcome::Exported { .. } => None,
            })
            .collect();

        let report = RunReport {
            attempted,
            succeeded: batch.succeeded,
            failed: batch.failed,
            failures,
            artifact,
        };

        log_summary(&report);
        Ok(report)
    }

    /// 只列出 app 與預計的檔名，不匯出也不寫檔
    pub async fn dry_run_on(&self, date: NaiveDate) -> Vec<PlannedItem> {
        let items = self.pipeline.list_all_items().await;
        self.pipeline.plan(items, date)
    }
}

impl ExportEngine<ConsoleClient, LocalStorage, ExportSettings> {
    /// 先解析憑證再建立 HTTP client；找不到憑證時不會發出任何請求
    pub fn connect(
        settings: ExportSettings,
        token_chain: &CredentialChain,
        cookie_chain: &CredentialChain,
    ) -> Result<Self> {
        settings.validate()?;
        let credentials = Credentials::resolve(token_chain, cookie_chain)?;
        tracing::info!(
            "🔑 Console token found ({} chars), session cookie: {}",
            credentials.token_len(),
            if credentials.cookie.is_some() { "yes" } else { "no" }
        );

        let client = ConsoleClient::new(
            &settings.base_url,
            settings.auth,
            credentials.token,
            credentials.cookie,
            settings.timeout(),
        )?;
        let storage = LocalStorage::new(settings.output_path.clone());

        Ok(Self::new(ExportPipeline::new(client, storage, settings)))
    }
}

fn log_summary(report: &RunReport) {
    tracing::info!(
        "🎉 Export finished: {}/{} apps succeeded, {} failed",
        report.succeeded,
        report.attempted,
        report.failed
    );

    match &report.artifact {
        Some(OutputArtifact::Archive { path, entries }) => {
            tracing::info!("📦 Archive saved to {} ({} files)", path, entries.len());
        }
        Some(OutputArtifact::Files { paths }) => {
            tracing::info!("📁 {} files saved", paths.len());
        }
        None => {}
    }

    if !report.is_complete() {
        tracing::warn!(
            "⚠️ {} apps failed to export, see the errors above",
            report.shortfall()
        );
        for failure in &report.failures {
            tracing::warn!("   - {} ({}): {}", failure.name, failure.item_id, failure.reason);
        }
    }
}
