//! Download orchestrator: paginate then cache, one asset at a time.

use super::cache::{CsvCache, WriteReport};
use super::paginate::Paginator;
use super::provider::{DataError, DownloadProgress, KlineProvider};
use crate::domain::{DomainError, TimeRange, TradingPair};
use thiserror::Error;
use tracing::{debug, info};

/// Summary of a completed batch download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub range: TimeRange,
    /// One report per distinct asset, in caller order.
    pub reports: Vec<WriteReport>,
}

impl DownloadSummary {
    pub fn total_rows(&self) -> usize {
        self.reports.iter().map(|r| r.rows_written).sum()
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download request: {0}")]
    Invalid(#[from] DomainError),

    /// The batch stopped at `asset`. Artifacts in `completed` were written
    /// before the failure and remain valid.
    #[error("download aborted at {asset} ({} assets cached before it): {source}", .completed.len())]
    Asset {
        asset: String,
        completed: Vec<WriteReport>,
        #[source]
        source: DataError,
    },
}

impl DownloadError {
    /// The underlying data error, if the batch failed on an asset.
    pub fn data_error(&self) -> Option<&DataError> {
        match self {
            DownloadError::Asset { source, .. } => Some(source),
            DownloadError::Invalid(_) => None,
        }
    }
}

/// Download several assets quoted in `quote` over `range`.
///
/// Assets are processed sequentially in caller order; a repeated symbol is
/// fetched once. The first failing asset aborts the batch.
pub fn download_assets(
    provider: &dyn KlineProvider,
    cache: &CsvCache,
    paginator: &Paginator,
    assets: &[&str],
    quote: &str,
    range: &TimeRange,
    progress: &dyn DownloadProgress,
) -> Result<DownloadSummary, DownloadError> {
    if assets.is_empty() {
        return Err(DomainError::EmptyAssetList.into());
    }

    let total = assets.len();
    let mut reports: Vec<WriteReport> = Vec::with_capacity(total);

    for (i, asset) in assets.iter().enumerate() {
        let pair = match TradingPair::new(asset, quote) {
            Ok(pair) => pair,
            Err(e) => {
                let source = DataError::from(e);
                progress.on_complete(asset, i, total, &Err(source.clone()));
                progress.on_batch_complete(reports.len(), total);
                return Err(abort(asset, reports, source));
            }
        };
        if reports.iter().any(|r| r.asset == pair.base) {
            debug!(asset = %pair.base, "repeated asset skipped");
            continue;
        }

        progress.on_start(&pair.base, i, total);
        let result = download_single(provider, cache, paginator, &pair, range);
        let rows = result.as_ref().map(|r| r.rows_written).map_err(Clone::clone);
        progress.on_complete(&pair.base, i, total, &rows);

        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                progress.on_batch_complete(reports.len(), total);
                return Err(abort(&pair.base, reports, e));
            }
        }
    }

    progress.on_batch_complete(reports.len(), total);
    let summary = DownloadSummary {
        range: *range,
        reports,
    };
    info!(
        assets = summary.reports.len(),
        rows = summary.total_rows(),
        "download complete"
    );
    Ok(summary)
}

/// Fetch the whole range for one pair, then write it.
fn download_single(
    provider: &dyn KlineProvider,
    cache: &CsvCache,
    paginator: &Paginator,
    pair: &TradingPair,
    range: &TimeRange,
) -> Result<WriteReport, DataError> {
    let series = paginator.collect(provider, pair, range)?;
    cache.write(pair, paginator.interval(), &series)
}

fn abort(asset: &str, completed: Vec<WriteReport>, source: DataError) -> DownloadError {
    DownloadError::Asset {
        asset: asset.to_string(),
        completed,
        source,
    }
}
