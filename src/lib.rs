pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{AuthScheme, ConsoleClient, LocalStorage};
pub use config::{ExportSettings, TomlConfig};
pub use crate::core::{engine::ExportEngine, pipeline::ExportPipeline};
pub use domain::model::{ExecutionMode, Item, OutputArtifact, OutputMode, RunReport};
pub use utils::error::{ExportError, Result};
