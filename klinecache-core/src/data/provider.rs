//! Kline provider trait and structured error types.
//!
//! The KlineProvider trait abstracts over the exchange endpoint so the
//! paginator can be driven by the live Binance API, a retry decorator, or a
//! recorded fixture in tests.

use crate::domain::{DomainError, Interval, PricePoint, TradingPair};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What went wrong on the filesystem side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The artifact for an asset does not exist.
    NotFound,
    /// Create/read/write/rename failure.
    Io,
    /// The artifact exists but its contents are not a valid series.
    Format,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageErrorKind::NotFound => "not found",
            StorageErrorKind::Io => "i/o",
            StorageErrorKind::Format => "format",
        };
        f.write_str(s)
    }
}

/// Structured error types for data operations.
///
/// Every variant carries enough context (pair, range or path) for the caller
/// to retry the failed piece by hand.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("fetch failed for {pair} [{start} .. {end}]: {reason}")]
    Fetch {
        pair: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: String,
    },

    #[error("unexpected response shape for {pair}: {reason}")]
    Parse { pair: String, reason: String },

    #[error("storage error ({kind}) at {}: {reason}", .path.display())]
    Storage {
        kind: StorageErrorKind,
        path: PathBuf,
        reason: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl DataError {
    pub fn storage(kind: StorageErrorKind, path: &Path, reason: impl Into<String>) -> Self {
        DataError::Storage {
            kind,
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, reason: impl fmt::Display) -> Self {
        Self::storage(StorageErrorKind::Io, path, reason.to_string())
    }

    pub fn format(path: &Path, reason: impl fmt::Display) -> Self {
        Self::storage(StorageErrorKind::Format, path, reason.to_string())
    }

    /// Storage kind, if this is a storage error.
    pub fn storage_kind(&self) -> Option<StorageErrorKind> {
        match self {
            DataError::Storage { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.storage_kind() == Some(StorageErrorKind::NotFound)
    }

    /// Transient failures an outer retry policy may repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Fetch { .. })
    }
}

/// One bounded kline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub pair: TradingPair,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: u32,
}

impl PageRequest {
    /// Build a [`DataError::Fetch`] for this request.
    pub fn fetch_error(&self, reason: impl Into<String>) -> DataError {
        DataError::Fetch {
            pair: self.pair.symbol(),
            start: self.start,
            end: self.end,
            reason: reason.into(),
        }
    }

    /// Build a [`DataError::Parse`] for this request.
    pub fn parse_error(&self, reason: impl Into<String>) -> DataError {
        DataError::Parse {
            pair: self.pair.symbol(),
            reason: reason.into(),
        }
    }
}

/// Source of candlestick pages.
///
/// One call is one network request; implementations must not paginate or
/// retry on their own. The cache layer sits above this trait.
pub trait KlineProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the klines covering `[request.start, request.end]`, at most
    /// `request.limit` of them, oldest first.
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<PricePoint>, DataError>;
}

impl<P: KlineProvider + ?Sized> KlineProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<PricePoint>, DataError> {
        (**self).fetch_page(request)
    }
}

/// Progress callback for multi-asset downloads.
pub trait DownloadProgress: Send {
    /// Called when starting to collect an asset.
    fn on_start(&self, asset: &str, index: usize, total: usize);

    /// Called when an asset is written (`Ok(rows)`) or has failed.
    fn on_complete(&self, asset: &str, index: usize, total: usize, result: &Result<usize, DataError>);

    /// Called once the batch stops, either complete or aborted.
    fn on_batch_complete(&self, succeeded: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, asset: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {asset}...", index + 1, total);
    }

    fn on_complete(
        &self,
        asset: &str,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataError>,
    ) {
        match result {
            Ok(rows) => println!("  OK: {asset} ({rows} rows)"),
            Err(e) => println!("  FAIL: {asset}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, total: usize) {
        println!("\nDownload finished: {succeeded}/{total} assets cached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detectable() {
        let err = DataError::storage(StorageErrorKind::NotFound, Path::new("x/BTC.csv"), "missing");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("BTC.csv"));
    }

    #[test]
    fn fetch_error_carries_range_and_pair() {
        let req = PageRequest {
            pair: TradingPair::new("BTC", "USDT").unwrap(),
            interval: Interval::OneHour,
            start: DateTime::from_timestamp(0, 0).unwrap(),
            end: DateTime::from_timestamp(7200, 0).unwrap(),
            limit: 2,
        };
        let err = req.fetch_error("connection refused");
        assert!(err.is_retryable());
        let msg = err.to_string();
        assert!(msg.contains("BTCUSDT"));
        assert!(msg.contains("1970-01-01 02:00:00 UTC"));
        assert!(msg.contains("connection refused"));
    }
}
