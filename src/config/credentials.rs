//! Console 憑證解析。
//!
//! 依固定順序嘗試每個來源，第一個非空（去除空白後）的值勝出：
//!
//! 1. `--token` 命令列參數
//! 2. `DIFY_CONSOLE_TOKEN` 環境變數（啟動時會先載入 `.env`）
//! 3. token 檔案（`--token-file` 或設定檔的 `source.token_file`）
//! 4. 設定檔的 `source.token`
//!
//! 全部落空時回傳 `MissingCredential`，此時還沒有建立任何 HTTP client。

use crate::utils::error::{ExportError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "DIFY_CONSOLE_TOKEN";
pub const COOKIE_ENV_VAR: &str = "DIFY_CONSOLE_COOKIE";

pub trait CredentialSource: Send + Sync {
    fn name(&self) -> String;
    fn fetch(&self) -> Option<String>;
}

pub struct CliFlag {
    flag: &'static str,
    value: Option<String>,
}

impl CliFlag {
    pub fn new(flag: &'static str, value: Option<String>) -> Self {
        Self { flag, value }
    }
}

impl CredentialSource for CliFlag {
    fn name(&self) -> String {
        self.flag.to_string()
    }

    fn fetch(&self) -> Option<String> {
        self.value.clone()
    }
}

pub struct EnvVar {
    var: String,
}

impl EnvVar {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvVar {
    fn name(&self) -> String {
        self.var.clone()
    }

    fn fetch(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

pub struct TokenFile {
    path: Option<PathBuf>,
}

impl TokenFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl CredentialSource for TokenFile {
    fn name(&self) -> String {
        match &self.path {
            Some(path) => format!("token file {}", path.display()),
            None => "token file".to_string(),
        }
    }

    fn fetch(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!("⚠️ Cannot read token file {}: {}", path.display(), e);
                None
            }
        }
    }
}

pub struct ConfigValue {
    key: &'static str,
    value: Option<String>,
}

impl ConfigValue {
    pub fn new(key: &'static str, value: Option<String>) -> Self {
        Self { key, value }
    }
}

impl CredentialSource for ConfigValue {
    fn name(&self) -> String {
        format!("config {}", self.key)
    }

    fn fetch(&self) -> Option<String> {
        // 未被替換的 ${VAR} 視為沒有設定
        self.value
            .clone()
            .filter(|v| !(v.starts_with("${") && v.ends_with('}')))
    }
}

#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// 回傳第一個有值的來源名稱與其值
    pub fn first_present(&self) -> Option<(String, SecretString)> {
        self.sources.iter().find_map(|source| {
            let value = source.fetch()?;
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some((source.name(), SecretString::new(trimmed.to_string())))
            }
        })
    }

    pub fn resolve(&self) -> Result<SecretString> {
        match self.first_present() {
            Some((source, secret)) => {
                tracing::debug!("🔑 Console token resolved from {}", source);
                Ok(secret)
            }
            None => Err(ExportError::MissingCredential {
                tried: self.source_names(),
            }),
        }
    }
}

/// 解析完成的憑證；Debug 輸出不含實際內容
pub struct Credentials {
    pub token: SecretString,
    pub cookie: Option<SecretString>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("cookie", &self.cookie.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    pub fn resolve(token_chain: &CredentialChain, cookie_chain: &CredentialChain) -> Result<Self> {
        let token = token_chain.resolve()?;
        let cookie = cookie_chain.first_present().map(|(_, cookie)| cookie);
        Ok(Self { token, cookie })
    }

    pub fn token_len(&self) -> usize {
        self.token.expose_secret().len()
    }
}
