//! Serializable pipeline configuration.
//!
//! Every top-level operation takes a [`PipelineConfig`]. It can be loaded from
//! TOML where every key is optional; missing keys keep their defaults.
//!
//! ```toml
//! storage_path = "data_1h"
//! quote_asset = "USDT"
//! fields = ["close", "volume"]
//! step = "1h"
//! page_limit = 1000
//! base_url = "https://api.binance.com"
//! timeout_secs = 30
//! max_retries = 2
//! retry_base_delay_ms = 500
//! ```

use crate::data::binance::{BINANCE_BASE_URL, MAX_PAGE_LIMIT};
use crate::data::paginate::Paginator;
use crate::data::retry::RetryPolicy;
use crate::domain::{normalize_symbol, DomainError, Field, Interval};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding one CSV artifact per asset.
    pub storage_path: PathBuf,

    /// Quote asset appended to every base symbol.
    pub quote_asset: String,

    /// Fields retained on load.
    pub fields: Vec<Field>,

    /// Candle interval.
    pub step: Interval,

    /// Records per request, 1..=1000.
    pub page_limit: u32,

    pub base_url: String,

    /// Per-request HTTP timeout.
    pub timeout_secs: u64,

    /// Retries of failed fetches. Zero keeps the core path retry-free.
    pub max_retries: u32,

    pub retry_base_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("data_1h"),
            quote_asset: "USDT".to_string(),
            fields: Field::default_set(),
            step: Interval::OneHour,
            page_limit: MAX_PAGE_LIMIT,
            base_url: BINANCE_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 0,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(DomainError::InvalidPageLimit {
                got: self.page_limit,
                max: MAX_PAGE_LIMIT,
            });
        }
        if self.fields.is_empty() {
            return Err(DomainError::EmptyFieldList);
        }
        normalize_symbol(&self.quote_asset)?;
        Ok(())
    }

    pub fn paginator(&self) -> Result<Paginator, DomainError> {
        self.validate()?;
        Paginator::new(self.step, self.page_limit)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.storage_path, PathBuf::from("data_1h"));
        assert_eq!(config.fields, vec![Field::Close]);
        assert_eq!(config.page_limit, 1000);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = PipelineConfig::from_toml(
            r#"
            quote_asset = "BUSD"
            fields = ["close", "volume"]
            step = "4h"
            max_retries = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.quote_asset, "BUSD");
        assert_eq!(config.fields, vec![Field::Close, Field::Volume]);
        assert_eq!(config.step, Interval::FourHours);
        assert_eq!(config.retry_policy().max_retries, 3);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn rejects_out_of_range_page_limit() {
        for limit in [0, 1001] {
            let err = PipelineConfig::from_toml(&format!("page_limit = {limit}")).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid(DomainError::InvalidPageLimit { .. })
            ));
        }
    }

    #[test]
    fn rejects_empty_fields_and_unknown_keys() {
        assert!(matches!(
            PipelineConfig::from_toml("fields = []"),
            Err(ConfigError::Invalid(DomainError::EmptyFieldList))
        ));
        assert!(matches!(
            PipelineConfig::from_toml("storage = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_non_alphanumeric_quote() {
        assert!(matches!(
            PipelineConfig::from_toml("quote_asset = \"US/DT\""),
            Err(ConfigError::Invalid(DomainError::InvalidSymbol(_)))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = PipelineConfig::default();
        config.step = Interval::OneDay;
        let text = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn from_file_reports_path() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/klinecache.toml")).unwrap_err();
        assert!(err.to_string().contains("klinecache.toml"));
    }
}
