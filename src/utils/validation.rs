use crate::utils::error::{ExportError, Result};
use crate::utils::naming::ILLEGAL_FILENAME_CHARS;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ExportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 檔名片段（後綴、副檔名、壓縮檔前綴）不能為空，也不能含非法字元
pub fn validate_filename_component(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }

    if let Some(c) = value.chars().find(|c| ILLEGAL_FILENAME_CHARS.contains(c)) {
        return Err(ExportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Character '{}' is not allowed in file names", c),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.base_url", "https://dify.example.com/console/api").is_ok());
        assert!(validate_url("source.base_url", "http://localhost/console/api").is_ok());
        assert!(validate_url("source.base_url", "").is_err());
        assert!(validate_url("source.base_url", "invalid-url").is_err());
        assert!(validate_url("source.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("export.concurrent_requests", 5, 1).is_ok());
        assert!(validate_positive_number("export.concurrent_requests", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("source.page_size", 100, 1, 1000).is_ok());
        assert!(validate_range("source.page_size", 0, 1, 1000).is_err());
        assert!(validate_range("source.page_size", 1001, 1, 1000).is_err());
    }

    #[test]
    fn test_validate_filename_component() {
        assert!(validate_filename_component("export.extension", "yaml").is_ok());
        assert!(validate_filename_component("export.extension", "  ").is_err());
        assert!(validate_filename_component("export.file_suffix", "a/b").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("export.output_path", "./output").is_ok());
        assert!(validate_path("export.output_path", "").is_err());
        assert!(validate_path("export.output_path", "out\0put").is_err());
    }
}
