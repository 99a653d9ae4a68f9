use crate::domain::model::{ExecutionMode, ExportPayload, Item, OutputMode};
use crate::utils::error::Result;
use crate::utils::naming::FileNaming;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn page_size(&self) -> usize;
    fn max_pages(&self) -> u32;
    fn output_mode(&self) -> OutputMode;
    fn execution_mode(&self) -> ExecutionMode;
    fn concurrent_requests(&self) -> usize;
    fn naming(&self) -> &FileNaming;
}

/// Console API 的 app 來源
#[async_trait]
pub trait AppSource: Send + Sync {
    async fn list_page(&self, page: u32, limit: usize) -> Result<Vec<Item>>;
    async fn export_item(&self, item: &Item) -> Result<ExportPayload>;
}
