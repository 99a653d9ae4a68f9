use crate::domain::model::Item;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;

/// 常見檔案系統不允許出現在檔名中的字元
pub const ILLEGAL_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const REPLACEMENT: char = '_';

pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect()
}

/// YYYYMMDD，本地時區
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub suffix: String,
    pub extension: String,
    pub archive_prefix: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            suffix: "workflow".to_string(),
            extension: "yaml".to_string(),
            archive_prefix: "dify_apps_yaml".to_string(),
        }
    }
}

impl FileNaming {
    pub fn item_file_name(&self, item: &Item, date: NaiveDate) -> String {
        format!(
            "{}_{}_{}.{}",
            sanitize(&item.display_name()),
            self.suffix,
            date_stamp(date),
            self.extension
        )
    }

    pub fn archive_file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.zip", self.archive_prefix, date_stamp(date))
    }

    /// 依清單順序為每個 app 決定檔名。
    /// 重複的檔名會在副檔名前插入 `_{id}`，避免後者覆蓋前者。
    pub fn plan(&self, items: &[Item], date: NaiveDate) -> Vec<String> {
        let mut taken = HashSet::with_capacity(items.len());
        items
            .iter()
            .map(|item| {
                let base = self.item_file_name(item, date);
                let name = if taken.contains(&base) {
                    format!(
                        "{}_{}_{}_{}.{}",
                        sanitize(&item.display_name()),
                        self.suffix,
                        date_stamp(date),
                        sanitize(&item.id),
                        self.extension
                    )
                } else {
                    base
                };
                taken.insert(name.clone());
                name
            })
            .collect()
    }
}
