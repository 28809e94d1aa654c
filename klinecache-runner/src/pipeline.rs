//! Top-level pipeline operations driven by a [`PipelineConfig`].
//!
//! `collect` downloads and caches; `load` reads back and aligns; `stats`
//! feeds the aligned table to the return statistics. The two halves share
//! nothing but the storage directory.

use crate::stats::{ReturnStats, StatsError};
use klinecache_core::data::{
    download_assets, load_aligned, AlignedTable, BinanceProvider, CacheStatus, CsvCache,
    DataError, DownloadError, DownloadProgress, DownloadSummary, KlineProvider, PageWindow,
    RetryingProvider,
};
use klinecache_core::domain::{DomainError, Field, TimeRange};
use klinecache_core::{ConfigError, PipelineConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid request: {0}")]
    Invalid(#[from] DomainError),

    #[error("http client: {0}")]
    Client(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("statistics: {0}")]
    Stats(#[from] StatsError),
}

/// Build the live Binance provider from `config`.
pub fn binance_provider(config: &PipelineConfig) -> Result<BinanceProvider, PipelineError> {
    BinanceProvider::new(config.base_url.clone(), config.timeout())
        .map_err(|e| PipelineError::Client(e.to_string()))
}

/// Request windows `collect` would issue per asset, without fetching.
pub fn plan(config: &PipelineConfig, range: &TimeRange) -> Result<Vec<PageWindow>, PipelineError> {
    Ok(config.paginator()?.plan_windows(range))
}

/// Download `assets` over `range` and cache one artifact per asset.
///
/// The provider is wrapped in the configured retry policy; with the default
/// of zero retries every fetch error aborts immediately.
pub fn collect(
    config: &PipelineConfig,
    assets: &[&str],
    range: &TimeRange,
    provider: &dyn KlineProvider,
    progress: &dyn DownloadProgress,
) -> Result<DownloadSummary, PipelineError> {
    let paginator = config.paginator()?;
    let cache = CsvCache::new(&config.storage_path);
    let provider = RetryingProvider::new(provider, config.retry_policy());

    info!(
        assets = assets.len(),
        provider = provider.name(),
        interval = %config.step,
        start = %range.start(),
        end = %range.end(),
        "collect started"
    );
    let summary = download_assets(
        &provider,
        &cache,
        &paginator,
        assets,
        &config.quote_asset,
        range,
        progress,
    )?;
    Ok(summary)
}

/// Load cached `assets` restricted to `range` and `config.fields`.
pub fn load(
    config: &PipelineConfig,
    assets: &[&str],
    range: &TimeRange,
) -> Result<AlignedTable, PipelineError> {
    config.validate()?;
    let cache = CsvCache::new(&config.storage_path);
    Ok(load_aligned(&cache, assets, &config.fields, range)?)
}

/// Load `field` for `assets` and compute their return statistics.
pub fn stats(
    config: &PipelineConfig,
    assets: &[&str],
    range: &TimeRange,
    field: Field,
) -> Result<ReturnStats, PipelineError> {
    config.validate()?;
    let cache = CsvCache::new(&config.storage_path);
    let table = load_aligned(&cache, assets, &[field], range)?;
    Ok(ReturnStats::compute(&table, field)?)
}

/// Cache status for `assets` under `config.storage_path`.
pub fn status(config: &PipelineConfig, assets: &[&str]) -> Vec<CacheStatus> {
    CsvCache::new(&config.storage_path).status(assets)
}
