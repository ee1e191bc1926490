//! API configuration: base URL and credentials.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "https://api.harvardartmuseums.org";
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    apikey: Option<String>,
    #[serde(rename = "base_url")]
    base_url: Option<String>,
    #[serde(rename = "page_size")]
    page_size: Option<u32>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("curio").join("config.toml"))
}

fn load_config_file() -> Result<ConfigFile> {
    let Some(path) = config_path() else {
        return Ok(ConfigFile::default());
    };
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config at {}", path.display()))
}

impl ApiConfig {
    /// Resolve configuration: environment variables win, then the user
    /// config file, then built-in defaults. A missing API key is a hard
    /// error since every request requires one.
    pub fn load() -> Result<Self> {
        let file = load_config_file()?;

        let base_url = std::env::var("CURIO_API_URL")
            .ok()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = match std::env::var("CURIO_API_KEY").ok().or(file.apikey) {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!(
                "no API key configured; set CURIO_API_KEY or add `apikey = \"...\"` to {}",
                config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "the curio config file".to_string())
            ),
        };

        Ok(Self {
            base_url,
            api_key,
            page_size: file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses_all_fields() {
        let file: ConfigFile =
            toml::from_str("apikey = \"abc\"\nbase_url = \"http://localhost:1234\"\npage_size = 25")
                .unwrap();
        assert_eq!(file.apikey.as_deref(), Some("abc"));
        assert_eq!(file.base_url.as_deref(), Some("http://localhost:1234"));
        assert_eq!(file.page_size, Some(25));
    }

    #[test]
    fn config_file_tolerates_missing_fields() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert!(file.apikey.is_none());
        assert!(file.page_size.is_none());
    }
}
