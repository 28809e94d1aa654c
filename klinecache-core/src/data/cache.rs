//! CSV cache layer.
//!
//! Layout: `{cache_dir}/{ASSET}.csv` plus a `{ASSET}.meta.json` sidecar.
//!
//! - One artifact per asset, rewritten whole on every write (last write wins)
//! - Atomic writes (write to `.csv.tmp`, rename into place)
//! - Rows deduplicated by timestamp, first arrival kept, ascending order
//! - Values stored as exact decimal text
//! - Metadata sidecar per asset (pair, interval, time span, row count, gaps, hash)

use super::align::AssetFrame;
use super::canonicalize::{Canonicalizer, GapReport};
use super::provider::{DataError, StorageErrorKind};
use super::schema::SeriesSchema;
use crate::domain::{normalize_symbol, Field, Interval, PricePoint, Series, TimeRange, TradingPair};
use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Metadata sidecar for a cached asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub asset: String,
    pub pair: String,
    pub interval: Interval,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub row_count: usize,
    /// Missing interval slots between the first and last row.
    #[serde(default)]
    pub gaps: Vec<GapReport>,
    /// BLAKE3 of the CSV bytes.
    pub data_hash: String,
    pub cached_at: DateTime<Utc>,
}

impl CacheMeta {
    /// Total candles missing inside the cached span.
    pub fn missing_candles(&self) -> usize {
        self.gaps.iter().map(|g| g.missing).sum()
    }
}

/// Outcome of one [`CsvCache::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub asset: String,
    pub path: PathBuf,
    pub rows_in: usize,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
}

/// The CSV cache.
#[derive(Debug, Clone)]
pub struct CsvCache {
    cache_dir: PathBuf,
}

impl CsvCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `{cache_dir}/{ASSET}.csv`
    pub fn series_path(&self, asset: &str) -> PathBuf {
        self.cache_dir.join(format!("{asset}.csv"))
    }

    /// `{cache_dir}/{ASSET}.meta.json`
    pub fn meta_path(&self, asset: &str) -> PathBuf {
        self.cache_dir.join(format!("{asset}.meta.json"))
    }

    /// Persist one asset's series, replacing any existing artifact.
    ///
    /// The artifact is named after the pair's base asset. An empty series
    /// produces a header-only file.
    pub fn write(
        &self,
        pair: &TradingPair,
        interval: Interval,
        series: &[PricePoint],
    ) -> Result<WriteReport, DataError> {
        let asset = pair.base.as_str();
        normalize_symbol(asset)?;
        fs::create_dir_all(&self.cache_dir).map_err(|e| DataError::io(&self.cache_dir, e))?;

        let path = self.series_path(asset);
        let mut df = series_to_dataframe(series)
            .and_then(|df| Canonicalizer::canonicalize(df.lazy()).collect())
            .map_err(|e| DataError::format(&path, e))?;
        SeriesSchema::validate(&df).map_err(|e| DataError::format(&path, e))?;

        let mut bytes = Vec::new();
        CsvWriter::new(&mut bytes)
            .include_header(true)
            .with_datetime_format(Some(SeriesSchema::TIMESTAMP_FORMAT.to_string()))
            .finish(&mut df)
            .map_err(|e| DataError::format(&path, e))?;

        let rows_written = df.height();
        let stamps: Vec<DateTime<Utc>> = series
            .iter()
            .map(|p| p.timestamp)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let gaps = Canonicalizer::detect_gaps(&stamps, interval);
        let meta = CacheMeta {
            asset: asset.to_string(),
            pair: pair.symbol(),
            interval,
            first_timestamp: stamps.first().copied(),
            last_timestamp: stamps.last().copied(),
            row_count: rows_written,
            gaps,
            data_hash: blake3::hash(&bytes).to_hex().to_string(),
            cached_at: Utc::now(),
        };
        let meta_path = self.meta_path(asset);
        let meta_json =
            serde_json::to_vec_pretty(&meta).map_err(|e| DataError::format(&meta_path, e))?;

        // A sidecar describing the previous artifact must not outlive it.
        match fs::remove_file(&meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(DataError::io(&meta_path, e)),
        }
        write_atomic(&path, &bytes)?;
        if let Err(e) = write_atomic(&meta_path, &meta_json) {
            warn!(
                asset,
                path = %path.display(),
                "artifact replaced but its metadata sidecar could not be written"
            );
            return Err(e);
        }

        let report = WriteReport {
            asset: asset.to_string(),
            path,
            rows_in: series.len(),
            rows_written,
            duplicates_dropped: series.len() - rows_written,
        };
        info!(
            asset,
            rows = report.rows_written,
            duplicates = report.duplicates_dropped,
            missing = meta.missing_candles(),
            path = %report.path.display(),
            "series cached"
        );
        Ok(report)
    }

    /// Read one asset restricted to `fields` and the inclusive `range`.
    ///
    /// Rows with an empty timestamp or an empty value in any retained field
    /// are dropped. A timestamp or value that is present but unparseable is
    /// a format error. If the file repeats a timestamp the first row wins.
    pub fn read(
        &self,
        asset: &str,
        fields: &[Field],
        range: &TimeRange,
    ) -> Result<AssetFrame, DataError> {
        normalize_symbol(asset)?;
        let path = self.series_path(asset);
        let df = read_csv(&path)?;
        SeriesSchema::require_columns(&df, fields).map_err(|e| DataError::format(&path, e))?;

        let column = |name: &str| -> Result<StringChunked, DataError> {
            let col = df.column(name).map_err(|e| DataError::format(&path, e))?;
            col.str()
                .cloned()
                .map_err(|e| DataError::format(&path, format!("column '{name}': {e}")))
        };
        let keys = column(SeriesSchema::KEY_COLUMN)?;
        let values = fields
            .iter()
            .map(|f| column(f.column_name()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut frame = AssetFrame::new(fields.to_vec());
        let mut dropped = 0usize;
        'rows: for i in 0..df.height() {
            let Some(raw_ts) = keys.get(i).map(str::trim).filter(|s| !s.is_empty()) else {
                dropped += 1;
                continue;
            };
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                DataError::format(&path, format!("row {}: bad timestamp '{raw_ts}'", i + 1))
            })?;
            if !range.contains(timestamp) {
                continue;
            }

            let mut row = Vec::with_capacity(fields.len());
            for (field, col) in fields.iter().zip(&values) {
                let Some(raw) = col.get(i).map(str::trim).filter(|s| !s.is_empty()) else {
                    dropped += 1;
                    continue 'rows;
                };
                let value = parse_decimal(raw).ok_or_else(|| {
                    DataError::format(&path, format!("row {}: bad {field} '{raw}'", i + 1))
                })?;
                row.push(value);
            }
            frame.insert(timestamp, row);
        }

        debug!(asset, rows = frame.len(), dropped, "series read");
        Ok(frame)
    }

    /// Read an asset's full cached series with every field.
    pub fn read_series(&self, asset: &str) -> Result<Series, DataError> {
        let frame = self.read(asset, &Field::ALL, &TimeRange::unbounded())?;
        Ok(frame
            .rows()
            .map(|(timestamp, v)| PricePoint {
                timestamp,
                open: v[0],
                high: v[1],
                low: v[2],
                close: v[3],
                volume: v[4],
            })
            .collect())
    }

    /// Metadata for an asset, if the sidecar exists and parses.
    pub fn get_meta(&self, asset: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(asset)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Whether the artifact's bytes still match the hash in its sidecar.
    pub fn verify(&self, asset: &str) -> Result<bool, DataError> {
        let path = self.series_path(asset);
        let bytes = fs::read(&path).map_err(|e| map_read_error(&path, e))?;
        let meta = self.get_meta(asset).ok_or_else(|| {
            DataError::storage(
                StorageErrorKind::NotFound,
                &self.meta_path(asset),
                "metadata sidecar missing or unreadable",
            )
        })?;
        Ok(blake3::hash(&bytes).to_hex().as_str() == meta.data_hash)
    }

    /// Cache status for each asset, in the order given.
    ///
    /// Symbols are normalized first; one that is not a valid symbol is
    /// reported as not cached without touching the filesystem.
    pub fn status(&self, assets: &[&str]) -> Vec<CacheStatus> {
        assets
            .iter()
            .map(|raw| {
                let Ok(asset) = normalize_symbol(raw) else {
                    return CacheStatus::missing(raw.trim());
                };
                let meta = self.get_meta(&asset);
                CacheStatus {
                    cached: self.series_path(&asset).exists(),
                    intact: meta.as_ref().and_then(|_| self.verify(&asset).ok()),
                    interval: meta.as_ref().map(|m| m.interval),
                    first_timestamp: meta.as_ref().and_then(|m| m.first_timestamp),
                    last_timestamp: meta.as_ref().and_then(|m| m.last_timestamp),
                    row_count: meta.as_ref().map(|m| m.row_count),
                    missing_candles: meta.as_ref().map(CacheMeta::missing_candles),
                    asset,
                }
            })
            .collect()
    }
}

/// Cache status for a single asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub asset: String,
    pub cached: bool,
    /// `None` when there is no sidecar to check against.
    pub intact: Option<bool>,
    pub interval: Option<Interval>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub row_count: Option<usize>,
    pub missing_candles: Option<usize>,
}

impl CacheStatus {
    fn missing(asset: &str) -> Self {
        Self {
            asset: asset.to_string(),
            cached: false,
            intact: None,
            interval: None,
            first_timestamp: None,
            last_timestamp: None,
            row_count: None,
            missing_candles: None,
        }
    }
}

// ── CSV I/O helpers ─────────────────────────────────────────────────

fn series_to_dataframe(series: &[PricePoint]) -> PolarsResult<DataFrame> {
    let timestamps: Vec<i64> = series
        .iter()
        .map(|p| p.timestamp.timestamp_millis())
        .collect();
    let mut columns = vec![Column::new(SeriesSchema::KEY_COLUMN.into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?];
    for field in Field::ALL {
        let text: Vec<String> = series.iter().map(|p| p.value(field).to_string()).collect();
        columns.push(Column::new(field.column_name().into(), text));
    }
    DataFrame::new(columns)
}

/// Read an artifact with every column as text.
fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    if let Err(e) = fs::metadata(path) {
        return Err(map_read_error(path, e));
    }
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DataError::format(path, e))
}

fn map_read_error(path: &Path, e: io::Error) -> DataError {
    if e.kind() == io::ErrorKind::NotFound {
        DataError::storage(StorageErrorKind::NotFound, path, "no cached artifact")
    } else {
        DataError::io(path, e)
    }
}

/// Write `bytes` next to `path` as `*.tmp`, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|e| DataError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::io(path, format!("atomic rename failed: {e}"))
    })
}

/// Accepts the written key format plus the `T` separated and RFC 3339 forms.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, SeriesSchema::TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|dt| dt.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hour(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn btc() -> TradingPair {
        TradingPair::new("BTC", "USDT").unwrap()
    }

    fn point(h: i64, close: &str) -> PricePoint {
        let close = Decimal::from_str(close).unwrap();
        PricePoint {
            timestamp: hour(h),
            open: close,
            high: close + Decimal::ONE,
            low: close - Decimal::ONE,
            close,
            volume: Decimal::new(12345, 3),
        }
    }

    fn series(hours: std::ops::RangeInclusive<i64>) -> Series {
        hours.map(|h| point(h, &format!("{}.25", 100 + h))).collect()
    }

    #[test]
    fn write_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        let original = vec![point(1, "42283.58000000"), point(2, "0.00001234")];

        let report = cache.write(&btc(), Interval::OneHour, &original).unwrap();
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.path, dir.path().join("BTC.csv"));

        let loaded = cache.read_series("BTC").unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded[0].close.to_string(), "42283.58000000");
    }

    #[test]
    fn artifact_text_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache
            .write(&btc(), Interval::OneHour, &[point(1, "42283.58")])
            .unwrap();

        let text = fs::read_to_string(cache.series_path("BTC")).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,open,high,low,close,volume"));
        assert_eq!(
            lines.next(),
            Some("2024-01-01 01:00:00,42283.58,42284.58,42282.58,42283.58,12.345")
        );
        assert!(!cache.series_path("BTC").with_extension("csv.tmp").exists());
    }

    #[test]
    fn window_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write(&btc(), Interval::OneHour, &series(0..=10)).unwrap();

        let range = TimeRange::new(hour(3), hour(7)).unwrap();
        let frame = cache.read("BTC", &[Field::Close], &range).unwrap();
        let stamps: Vec<_> = frame.timestamps().collect();
        assert_eq!(stamps, (3..=7).map(hour).collect::<Vec<_>>());
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        let err = cache
            .read("DOGE", &[Field::Close], &TimeRange::unbounded())
            .unwrap_err();
        assert_eq!(err.storage_kind(), Some(StorageErrorKind::NotFound));
    }

    #[test]
    fn dedup_keeps_first_arrival_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        let arrivals = vec![
            point(2, "2.0"),
            point(1, "1.0"),
            point(2, "9.9"),
            point(3, "3.0"),
        ];

        let report = cache.write(&btc(), Interval::OneHour, &arrivals).unwrap();
        assert_eq!(report.duplicates_dropped, 1);

        let loaded = cache.read_series("BTC").unwrap();
        let closes: Vec<String> = loaded.iter().map(|p| p.close.to_string()).collect();
        assert_eq!(closes, vec!["1.0", "2.0", "3.0"]);
    }

    #[test]
    fn empty_series_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("nested"));
        let report = cache.write(&btc(), Interval::OneHour, &[]).unwrap();
        assert_eq!(report.rows_written, 0);

        let text = fs::read_to_string(cache.series_path("BTC")).unwrap();
        assert_eq!(text.trim_end(), "timestamp,open,high,low,close,volume");

        let meta = cache.get_meta("BTC").unwrap();
        assert_eq!(meta.row_count, 0);
        assert_eq!(meta.first_timestamp, None);
    }

    #[test]
    fn missing_field_column_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ETH.csv"),
            "timestamp,close\n2024-01-01 01:00:00,10\n",
        )
        .unwrap();
        let cache = CsvCache::new(dir.path());

        let ok = cache.read("ETH", &[Field::Close], &TimeRange::unbounded());
        assert_eq!(ok.unwrap().len(), 1);

        let err = cache
            .read("ETH", &[Field::Volume], &TimeRange::unbounded())
            .unwrap_err();
        assert_eq!(err.storage_kind(), Some(StorageErrorKind::Format));
    }

    #[test]
    fn rows_with_empty_values_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ETH.csv"),
            "timestamp,close,volume\n\
             2024-01-01 01:00:00,10,1\n\
             2024-01-01 02:00:00,,1\n\
             ,12,1\n\
             2024-01-01 04:00:00,13,\n",
        )
        .unwrap();
        let cache = CsvCache::new(dir.path());

        let close_only = cache
            .read("ETH", &[Field::Close], &TimeRange::unbounded())
            .unwrap();
        let stamps: Vec<_> = close_only.timestamps().collect();
        assert_eq!(stamps, vec![hour(1), hour(4)]);

        let both = cache
            .read("ETH", &[Field::Close, Field::Volume], &TimeRange::unbounded())
            .unwrap();
        assert_eq!(both.len(), 1);
    }

    #[test]
    fn unparseable_timestamp_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ETH.csv"), "timestamp,close\nyesterday,10\n").unwrap();
        let cache = CsvCache::new(dir.path());
        let err = cache
            .read("ETH", &[Field::Close], &TimeRange::unbounded())
            .unwrap_err();
        assert_eq!(err.storage_kind(), Some(StorageErrorKind::Format));
    }

    #[test]
    fn meta_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write(&btc(), Interval::OneHour, &series(1..=4)).unwrap();

        let meta = cache.get_meta("BTC").unwrap();
        assert_eq!(meta.pair, "BTCUSDT");
        assert_eq!(meta.interval, Interval::OneHour);
        assert_eq!(meta.first_timestamp, Some(hour(1)));
        assert_eq!(meta.last_timestamp, Some(hour(4)));
        assert_eq!(meta.row_count, 4);
        assert!(meta.gaps.is_empty());
        assert!(cache.verify("BTC").unwrap());

        let statuses = cache.status(&["BTC", "ETH"]);
        assert!(statuses[0].cached);
        assert_eq!(statuses[0].intact, Some(true));
        assert!(!statuses[1].cached);
        assert_eq!(statuses[1].row_count, None);
    }

    #[test]
    fn tampered_artifact_fails_verify() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write(&btc(), Interval::OneHour, &series(1..=2)).unwrap();

        let path = cache.series_path("BTC");
        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str("2024-01-01 09:00:00,1,1,1,1,1\n");
        fs::write(&path, text).unwrap();

        assert!(!cache.verify("BTC").unwrap());
    }

    #[test]
    fn rewrite_replaces_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write(&btc(), Interval::OneHour, &series(1..=5)).unwrap();
        cache.write(&btc(), Interval::OneHour, &series(7..=8)).unwrap();

        let loaded = cache.read_series("BTC").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].timestamp, hour(7));
    }

    #[test]
    fn gaps_recorded_in_meta_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        let mut points = series(1..=3);
        points.extend(series(6..=7));
        cache.write(&btc(), Interval::OneHour, &points).unwrap();

        let meta = cache.get_meta("BTC").unwrap();
        assert_eq!(
            meta.gaps,
            vec![GapReport {
                after: hour(3),
                before: hour(6),
                missing: 2
            }]
        );
        assert_eq!(meta.missing_candles(), 2);
        assert_eq!(cache.status(&["BTC"])[0].missing_candles, Some(2));
    }

    #[test]
    fn failed_sidecar_write_leaves_no_stale_hash() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        cache.write(&btc(), Interval::OneHour, &series(1..=3)).unwrap();

        // Occupy the sidecar's temp path so only the metadata step fails.
        fs::create_dir(dir.path().join("BTC.meta.json.tmp")).unwrap();
        let err = cache
            .write(&btc(), Interval::OneHour, &series(5..=6))
            .unwrap_err();
        assert_eq!(err.storage_kind(), Some(StorageErrorKind::Io));

        assert_eq!(cache.read_series("BTC").unwrap().len(), 2);
        assert!(cache.get_meta("BTC").is_none());
        let status = &cache.status(&["BTC"])[0];
        assert!(status.cached);
        assert_eq!(status.intact, None);
    }

    #[test]
    fn path_like_asset_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("data"));
        let pair = TradingPair {
            base: "../X".to_string(),
            quote: "USDT".to_string(),
        };

        let err = cache.write(&pair, Interval::OneHour, &series(1..=2)).unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
        assert!(!dir.path().join("X.csv").exists());
        assert!(!dir.path().join("data").exists());

        let err = cache
            .read("../X", &[Field::Close], &TimeRange::unbounded())
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
    }

    #[test]
    fn status_normalizes_and_rejects_path_like_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path().join("data"));
        cache.write(&btc(), Interval::OneHour, &series(1..=2)).unwrap();
        fs::write(dir.path().join("BTC.csv"), "timestamp,close\n").unwrap();

        let statuses = cache.status(&["../btc", " btc "]);
        assert_eq!(statuses[0].asset, "../btc");
        assert!(!statuses[0].cached);
        assert_eq!(statuses[1].asset, "BTC");
        assert!(statuses[1].cached);
    }
}
