use crate::adapters::AuthScheme;
use crate::config::credentials::{
    CliFlag, ConfigValue, CredentialChain, EnvVar, TokenFile, COOKIE_ENV_VAR, TOKEN_ENV_VAR,
};
use crate::config::toml_config::TomlConfig;
use crate::domain::model::{ExecutionMode, OutputMode};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::naming::FileNaming;
use crate::utils::validation::{
    validate_filename_component, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost/console/api";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_PAGES: u32 = 10_000;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 合併預設值、設定檔與命令列之後的最終設定（不含憑證）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub base_url: String,
    pub auth: AuthScheme,
    pub page_size: usize,
    pub max_pages: u32,
    pub timeout_seconds: u64,
    pub output_mode: OutputMode,
    pub execution_mode: ExecutionMode,
    pub concurrent_requests: usize,
    pub output_path: String,
    pub naming: FileNaming,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthScheme::Bearer,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            output_mode: OutputMode::Archive,
            execution_mode: ExecutionMode::Concurrent,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            output_path: "./output".to_string(),
            naming: FileNaming::default(),
        }
    }
}

/// 命令列可以覆蓋的欄位；`None` 代表沿用下層設定
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub auth: Option<AuthScheme>,
    pub page_size: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub output_mode: Option<OutputMode>,
    pub execution_mode: Option<ExecutionMode>,
    pub concurrent_requests: Option<usize>,
    pub output_path: Option<String>,
    pub file_suffix: Option<String>,
    pub extension: Option<String>,
    pub archive_prefix: Option<String>,
}

/// 命令列提供的憑證來源
#[derive(Debug, Clone, Default)]
pub struct CredentialFlags {
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub cookie: Option<String>,
}

impl ExportSettings {
    /// 預設值 → 設定檔 → 命令列，後者優先
    pub fn layered(file: Option<&TomlConfig>, overrides: SettingsOverrides) -> Self {
        let mut settings = Self::default();
        if let Some(file) = file {
            settings.apply_file(file);
        }
        settings.apply_overrides(overrides);
        settings
    }

    fn apply_file(&mut self, file: &TomlConfig) {
        let source = &file.source;
        let export = &file.export;

        if let Some(base_url) = &source.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(auth) = source.auth {
            self.auth = auth;
        }
        if let Some(page_size) = source.page_size {
            self.page_size = page_size;
        }
        if let Some(max_pages) = source.max_pages {
            self.max_pages = max_pages;
        }
        if let Some(timeout) = source.timeout_seconds {
            self.timeout_seconds = timeout;
        }
        if let Some(mode) = export.mode {
            self.output_mode = mode;
        }
        if let Some(execution) = export.execution {
            self.execution_mode = execution;
        }
        if let Some(concurrent) = export.concurrent_requests {
            self.concurrent_requests = concurrent;
        }
        if let Some(output_path) = &export.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(suffix) = &export.file_suffix {
            self.naming.suffix = suffix.clone();
        }
        if let Some(extension) = &export.extension {
            self.naming.extension = extension.clone();
        }
        if let Some(prefix) = &export.archive_prefix {
            self.naming.archive_prefix = prefix.clone();
        }
    }

    fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        let SettingsOverrides {
            base_url,
            auth,
            page_size,
            timeout_seconds,
            output_mode,
            execution_mode,
            concurrent_requests,
            output_path,
            file_suffix,
            extension,
            archive_prefix,
        } = overrides;

        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self.auth = auth.unwrap_or(self.auth);
        self.page_size = page_size.unwrap_or(self.page_size);
        self.timeout_seconds = timeout_seconds.unwrap_or(self.timeout_seconds);
        self.output_mode = output_mode.unwrap_or(self.output_mode);
        self.execution_mode = execution_mode.unwrap_or(self.execution_mode);
        self.concurrent_requests = concurrent_requests.unwrap_or(self.concurrent_requests);
        if let Some(output_path) = output_path {
            self.output_path = output_path;
        }
        if let Some(suffix) = file_suffix {
            self.naming.suffix = suffix;
        }
        if let Some(extension) = extension {
            self.naming.extension = extension;
        }
        if let Some(prefix) = archive_prefix {
            self.naming.archive_prefix = prefix;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 依文件記載的順序建立 token 與 cookie 的來源鏈
pub fn credential_chains(
    flags: CredentialFlags,
    file: Option<&TomlConfig>,
) -> (CredentialChain, CredentialChain) {
    let source = file.map(|f| f.source.clone()).unwrap_or_default();
    let token_file = flags.token_file.or(source.token_file);

    let token_chain = CredentialChain::new()
        .with(CliFlag::new("--token", flags.token))
        .with(EnvVar::new(TOKEN_ENV_VAR))
        .with(TokenFile::new(token_file))
        .with(ConfigValue::new("source.token", source.token));

    let cookie_chain = CredentialChain::new()
        .with(CliFlag::new("--cookie", flags.cookie))
        .with(EnvVar::new(COOKIE_ENV_VAR))
        .with(ConfigValue::new("source.cookie", source.cookie));

    (token_chain, cookie_chain)
}

impl ConfigProvider for ExportSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn naming(&self) -> &FileNaming {
        &self.naming
    }
}

impl Validate for ExportSettings {
    fn validate(&self) -> Result<()> {
        validate_url("source.base_url", &self.base_url)?;
        validate_range("source.page_size", self.page_size, 1, 1000)?;
        validate_range("source.max_pages", self.max_pages, 1, u32::MAX)?;
        validate_range("source.timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_positive_number("export.concurrent_requests", self.concurrent_requests, 1)?;
        validate_path("export.output_path", &self.output_path)?;
        validate_filename_component("export.file_suffix", &self.naming.suffix)?;
        validate_filename_component("export.extension", &self.naming.extension)?;
        validate_filename_component("export.archive_prefix", &self.naming.archive_prefix)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ExportSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.output_mode, OutputMode::Archive);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_beat_file_and_file_beats_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[source]
base_url = "https://file.example.com/console/api"
page_size = 20

[export]
mode = "files"
extension = "yml"
"#,
        )
        .unwrap();

        let overrides = SettingsOverrides {
            page_size: Some(50),
            archive_prefix: Some("backup".to_string()),
            ..Default::default()
        };

        let settings = ExportSettings::layered(Some(&file), overrides);

        assert_eq!(settings.base_url, "https://file.example.com/console/api");
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.output_mode, OutputMode::Files);
        assert_eq!(settings.naming.extension, "yml");
        assert_eq!(settings.naming.archive_prefix, "backup");
        assert_eq!(settings.naming.suffix, "workflow");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_page = ExportSettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(bad_page.validate().is_err());

        let bad_concurrency = ExportSettings {
            concurrent_requests: 0,
            ..Default::default()
        };
        assert!(bad_concurrency.validate().is_err());

        let mut bad_suffix = ExportSettings::default();
        bad_suffix.naming.suffix = "a|b".to_string();
        assert!(bad_suffix.validate().is_err());

        let bad_url = ExportSettings {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_flag_token_beats_config_token() {
        let file = TomlConfig::from_toml_str(
            r#"
[source]
token = "from-config"
cookie = "session=abc"
"#,
        )
        .unwrap();

        let flags = CredentialFlags {
            token: Some("from-flag".to_string()),
            ..Default::default()
        };

        let (token_chain, cookie_chain) = credential_chains(flags, Some(&file));

        assert_eq!(token_chain.resolve().unwrap().expose_secret(), "from-flag");
        assert_eq!(token_chain.source_names()[1], TOKEN_ENV_VAR);
        let (source, cookie) = cookie_chain.first_present().unwrap();
        assert_eq!(source, "config source.cookie");
        assert_eq!(cookie.expose_secret(), "session=abc");
    }
}
