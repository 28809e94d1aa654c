//! Return statistics: pure functions over an aligned table.
//!
//! Only rows where every asset has a value are used. Returns are log returns
//! between consecutive kept rows; the covariance uses the sample (n − 1)
//! denominator.

use chrono::{DateTime, Utc};
use klinecache_core::data::AlignedTable;
use klinecache_core::domain::Field;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("table has no assets")]
    NoAssets,

    #[error("need at least {needed} returns, got {got} from {rows} complete rows")]
    InsufficientData {
        rows: usize,
        got: usize,
        needed: usize,
    },

    #[error("non-positive {field} for {asset} at {timestamp}: {price}")]
    NonPositivePrice {
        asset: String,
        field: Field,
        timestamp: DateTime<Utc>,
        price: Decimal,
    },
}

/// Mean vector and covariance matrix of per-asset log returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    /// Asset order of `mean` and both axes of `covariance`.
    pub assets: Vec<String>,
    pub field: Field,
    /// Number of returns per asset.
    pub observations: usize,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    pub mean: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
}

impl ReturnStats {
    /// Compute statistics for `field` over the table's complete rows.
    pub fn compute(table: &AlignedTable, field: Field) -> Result<Self, StatsError> {
        let assets = table.assets().to_vec();
        if assets.is_empty() {
            return Err(StatsError::NoAssets);
        }

        let rows = table.complete_rows(field);
        let mut prices: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
        for (timestamp, values) in &rows {
            let mut row = Vec::with_capacity(values.len());
            for (asset, price) in assets.iter().zip(values) {
                match price.to_f64() {
                    Some(p) if *price > Decimal::ZERO && p > 0.0 => row.push(p),
                    _ => {
                        return Err(StatsError::NonPositivePrice {
                            asset: asset.clone(),
                            field,
                            timestamp: *timestamp,
                            price: *price,
                        })
                    }
                }
            }
            prices.push(row);
        }

        let returns = log_returns(&prices);
        if returns.len() < 2 {
            return Err(StatsError::InsufficientData {
                rows: rows.len(),
                got: returns.len(),
                needed: 2,
            });
        }

        let mean = mean(&returns);
        let covariance = sample_covariance(&returns, &mean);
        Ok(Self {
            assets,
            field,
            observations: returns.len(),
            first_timestamp: rows[0].0,
            last_timestamp: rows[rows.len() - 1].0,
            mean,
            covariance,
        })
    }

    /// Per-asset standard deviation of returns.
    pub fn std_devs(&self) -> Vec<f64> {
        (0..self.assets.len())
            .map(|i| self.covariance[i][i].sqrt())
            .collect()
    }

    /// Pairwise correlation matrix derived from the covariance.
    pub fn correlation(&self) -> Vec<Vec<f64>> {
        let sd = self.std_devs();
        self.covariance
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, c)| {
                        let denom = sd[i] * sd[j];
                        if denom > 0.0 {
                            c / denom
                        } else {
                            f64::NAN
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

// ─── Individual functions ───────────────────────────────────────────

/// `ln(p_t / p_{t−1})` per column over consecutive rows. Prices must be
/// positive.
pub fn log_returns(prices: &[Vec<f64>]) -> Vec<Vec<f64>> {
    prices
        .windows(2)
        .map(|w| w[1].iter().zip(&w[0]).map(|(p, prev)| (p / prev).ln()).collect())
        .collect()
}

/// Column means. Empty input gives an empty vector.
pub fn mean(rows: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let n = rows.len() as f64;
    (0..first.len())
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
        .collect()
}

/// Sample covariance (n − 1 denominator). Needs at least two rows.
pub fn sample_covariance(rows: &[Vec<f64>], mean: &[f64]) -> Vec<Vec<f64>> {
    let k = mean.len();
    let denom = (rows.len() as f64 - 1.0).max(1.0);
    let mut cov = vec![vec![0.0; k]; k];
    for r in rows {
        for i in 0..k {
            let di = r[i] - mean[i];
            for j in i..k {
                cov[i][j] += di * (r[j] - mean[j]);
            }
        }
    }
    for i in 0..k {
        for j in i..k {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}
