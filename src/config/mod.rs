pub mod credentials;
pub mod settings;
pub mod toml_config;

pub use credentials::{CredentialChain, Credentials};
pub use settings::{credential_chains, CredentialFlags, ExportSettings, SettingsOverrides};
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::adapters::AuthScheme;
#[cfg(feature = "cli")]
use crate::domain::model::{ExecutionMode, OutputMode};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dify-export")]
#[command(about = "Export every Dify app as a YAML file or a single zip archive")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Console API base address, e.g. https://dify.example.com/console/api
    #[arg(long, env = "DIFY_BASE_URL")]
    pub base_url: Option<String>,

    /// Console token (takes precedence over DIFY_CONSOLE_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// File holding the console token
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// How the token is sent to the console
    #[arg(long, value_enum)]
    pub auth: Option<AuthScheme>,

    /// Session cookie header value sent along with every request
    #[arg(long)]
    pub cookie: Option<String>,

    /// Apps requested per listing page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write one file per app, or a single zip archive
    #[arg(long, value_enum)]
    pub mode: Option<OutputMode>,

    /// Export apps concurrently or one at a time
    #[arg(long, value_enum)]
    pub execution: Option<ExecutionMode>,

    /// Upper bound of in-flight export requests in concurrent execution
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Directory the files or the archive are written to
    #[arg(long)]
    pub output_path: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fixed part of every exported file name
    #[arg(long)]
    pub file_suffix: Option<String>,

    /// Extension of exported files
    #[arg(long)]
    pub extension: Option<String>,

    /// Archive file name prefix
    #[arg(long)]
    pub archive_prefix: Option<String>,

    /// List apps and planned file names without exporting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_file(&self) -> crate::Result<Option<TomlConfig>> {
        self.config.as_ref().map(TomlConfig::from_file).transpose()
    }

    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            base_url: self.base_url.clone(),
            auth: self.auth,
            page_size: self.page_size,
            timeout_seconds: self.timeout,
            output_mode: self.mode,
            execution_mode: self.execution,
            concurrent_requests: self.concurrent_requests,
            output_path: self.output_path.clone(),
            file_suffix: self.file_suffix.clone(),
            extension: self.extension.clone(),
            archive_prefix: self.archive_prefix.clone(),
        }
    }

    pub fn credential_flags(&self) -> CredentialFlags {
        CredentialFlags {
            token: self.token.clone(),
            token_file: self.token_file.clone(),
            cookie: self.cookie.clone(),
        }
    }
}
