use crate::compressor::CompressionSettings;
use crate::error::{FleetCheckError, Result};
use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SupabaseプロジェクトURL（例: https://xxxx.supabase.co）
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub timeout_seconds: u64,
    /// 送信成功からフォームリセットまでの待ち時間
    pub reset_delay_ms: u64,
    pub max_width: u32,
    pub jpeg_quality: u8,
    pub max_file_size_bytes: u64,
    #[serde(rename = "fleetcheck_language")]
    pub language: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FleetCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("fleetcheck").join("config.json"))
    }

    fn default_config() -> Self {
        let compression = CompressionSettings::default();
        Self {
            store_url: None,
            store_api_key: None,
            webhook_url: None,
            timeout_seconds: 30,
            reset_delay_ms: 2000,
            max_width: compression.max_width,
            jpeg_quality: compression.quality,
            max_file_size_bytes: compression.max_file_size,
            language: Locale::default(),
        }
    }

    // 環境変数を優先
    pub fn store_url(&self) -> Result<String> {
        setting("FLEETCHECK_STORE_URL", &self.store_url, "store_url")
    }

    pub fn store_api_key(&self) -> Result<String> {
        setting("FLEETCHECK_STORE_KEY", &self.store_api_key, "store_api_key")
    }

    pub fn webhook_url(&self) -> Result<String> {
        setting("FLEETCHECK_WEBHOOK_URL", &self.webhook_url, "webhook_url")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    pub fn compression_settings(&self) -> CompressionSettings {
        CompressionSettings {
            max_width: self.max_width,
            quality: self.jpeg_quality,
            max_file_size: self.max_file_size_bytes,
            ..CompressionSettings::default()
        }
    }

    pub fn set_language(&mut self, locale: Locale) -> Result<()> {
        self.language = locale;
        self.save()
    }
}

fn setting(env_key: &str, stored: &Option<String>, name: &'static str) -> Result<String> {
    if let Ok(value) = std::env::var(env_key) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }

    stored
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or(FleetCheckError::MissingSetting(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.reset_delay(), Duration::from_secs(2));
        assert_eq!(config.max_width, 1920);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.language, Locale::Ar);
    }

    #[test]
    fn test_language_key_name() {
        let config = Config {
            language: Locale::En,
            ..Config::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["fleetcheck_language"], "en");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"webhook_url": "https://hooks.example/x"}"#).unwrap();
        assert_eq!(config.webhook_url.as_deref(), Some("https://hooks.example/x"));
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.language, Locale::Ar);
    }

    #[test]
    fn test_missing_setting() {
        let config = Config {
            store_api_key: Some("  ".into()),
            ..Config::default()
        };
        if std::env::var("FLEETCHECK_STORE_KEY").is_err() {
            let err = config.store_api_key().unwrap_err();
            assert!(matches!(err, FleetCheckError::MissingSetting("store_api_key")));
        }
    }
}
