use serde::{Deserialize, Deserializer, Serialize};

/// Console 上可匯出的一個 app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
        }
    }

    /// 名稱缺少或為空字串時，用 id 產生固定的替代名稱
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("unknown-app-{}", self.id),
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// `GET /apps` 的回應
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub data: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub item_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputMode {
    /// 每個 app 一個檔案
    Files,
    /// 全部打包成一個不壓縮的 zip
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExecutionMode {
    Concurrent,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputArtifact {
    Files { paths: Vec<String> },
    Archive { path: String, entries: Vec<String> },
}

#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Exported { item: Item, file_name: String },
    Failed { item: Item, reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Exported { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item_id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ItemFailure>,
    pub artifact: Option<OutputArtifact>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.attempted
    }

    pub fn shortfall(&self) -> usize {
        self.attempted - self.succeeded
    }
}
