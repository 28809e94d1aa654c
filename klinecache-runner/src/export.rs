//! Export: CSV and JSON renderings of aligned tables and return statistics.
//!
//! - **Aligned CSV**: `timestamp` then one `{ASSET}_{field}` column per asset
//!   and field; holes are empty cells
//! - **Stats CSV**: one row per asset with its mean and covariance row
//! - **Stats JSON**: full serialization of [`ReturnStats`]

use std::path::Path;

use anyhow::{Context, Result};
use klinecache_core::data::{AlignedTable, SeriesSchema};
use klinecache_core::domain::Field;

use crate::stats::ReturnStats;

// ─── CSV export ─────────────────────────────────────────────────────

/// Render an aligned table as CSV over its union index.
pub fn aligned_to_csv(table: &AlignedTable, fields: &[Field]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![SeriesSchema::KEY_COLUMN.to_string()];
    for asset in table.assets() {
        for field in fields {
            header.push(format!("{asset}_{field}"));
        }
    }
    wtr.write_record(&header)?;

    for ts in table.index() {
        let mut record = vec![ts.format(SeriesSchema::TIMESTAMP_FORMAT).to_string()];
        for asset in table.assets() {
            for field in fields {
                record.push(
                    table
                        .value(asset, *field, ts)
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                );
            }
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Render return statistics as CSV.
///
/// Columns: asset, mean, then one covariance column per asset.
pub fn stats_to_csv(stats: &ReturnStats) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["asset".to_string(), "mean".to_string()];
    header.extend(stats.assets.iter().map(|a| format!("cov_{a}")));
    wtr.write_record(&header)?;

    for (i, asset) in stats.assets.iter().enumerate() {
        let mut record = vec![asset.clone(), format!("{:.12}", stats.mean[i])];
        record.extend(stats.covariance[i].iter().map(|c| format!("{c:.12}")));
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize return statistics to pretty JSON.
pub fn stats_to_json(stats: &ReturnStats) -> Result<String> {
    serde_json::to_string_pretty(stats).context("failed to serialize ReturnStats to JSON")
}

/// Write rendered output to `path`, creating parent directories.
pub fn save(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
