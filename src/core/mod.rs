pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{ExportPayload, Item, ItemOutcome, OutputArtifact, RunReport};
pub use crate::domain::ports::{AppSource, ConfigProvider, Storage};
pub use crate::utils::error::Result;
pub use engine::ExportEngine;
pub use pipeline::{ExportBatch, ExportPipeline, PlannedItem};
