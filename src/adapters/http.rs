use crate::domain::model::{ExportPayload, Item, ItemPage};
use crate::domain::ports::AppSource;
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// 每次執行只會使用其中一種驗證方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `x-csrf-token: <token>`，通常需要搭配 session cookie
    Csrf,
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

pub struct ConsoleClient {
    base_url: Url,
    auth: AuthScheme,
    token: SecretString,
    cookie: Option<SecretString>,
    client: Client,
}

impl ConsoleClient {
    pub fn new(
        base_url: &str,
        auth: AuthScheme,
        token: SecretString,
        cookie: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ExportError::InvalidConfigValueError {
            field: "source.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ExportError::InvalidConfigValueError {
                field: "source.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            auth,
            token,
            cookie,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match self.auth {
            AuthScheme::Bearer => request.bearer_auth(self.token.expose_secret()),
            AuthScheme::Csrf => request.header("x-csrf-token", self.token.expose_secret().as_str()),
        };

        match &self.cookie {
            Some(cookie) => request.header(reqwest::header::COOKIE, cookie.expose_secret().as_str()),
            None => request,
        }
    }
}

#[async_trait]
impl AppSource for ConsoleClient {
    async fn list_page(&self, page: u32, limit: usize) -> Result<Vec<Item>> {
        let url = self.endpoint(&["apps"]);
        tracing::debug!("Requesting app list page {} from {}", page, url);

        let response = self
            .authorized(self.client.get(url))
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("name", String::new()),
                ("is_created_by_me", "false".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("App list page {} response status: {}", page, status);

        if !status.is_success() {
            let reason = if status == reqwest::StatusCode::UNAUTHORIZED {
                "HTTP 401, authentication failed; check the token and login state".to_string()
            } else {
                format!("HTTP {}", status.as_u16())
            };
            return Err(ExportError::ListPageFailed { page, reason });
        }

        let body: ItemPage = response.json().await?;
        Ok(body.data)
    }

    async fn export_item(&self, item: &Item) -> Result<ExportPayload> {
        let url = self.endpoint(&["apps", item.id.as_str(), "export"]);
        tracing::debug!("Exporting app {} from {}", item.id, url);

        let response = self
            .authorized(self.client.get(url))
            .query(&[("include_secret", "false")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::ExportFailed {
                item_id: item.id.clone(),
                status: status.as_u16(),
            });
        }

        let body: ExportResponse = response.json().await?;
        match body.data {
            Some(serde_json::Value::String(content)) => Ok(ExportPayload {
                item_id: item.id.clone(),
                content,
            }),
            _ => Err(ExportError::MalformedExport {
                item_id: item.id.clone(),
            }),
        }
    }
}
