//! Binance spot kline provider.
//!
//! Issues one `GET /api/v3/klines` per page and parses the positional record
//! arrays into [`PricePoint`]s. No retries happen here; wrap the provider in
//! [`RetryingProvider`](super::retry::RetryingProvider) for that.
//!
//! Record layout (only the marked positions are read):
//! `[open_time, open*, high*, low*, close*, volume*, close_time*, ...]`

use super::provider::{DataError, KlineProvider, PageRequest};
use crate::domain::{DomainError, PricePoint};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_PAGE_LIMIT: u32 = 1000;

const CLOSE_TIME_POS: usize = 6;

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Binance REST kline provider (blocking).
pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("klinecache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the klines URL for one page.
    fn klines_url(&self, req: &PageRequest) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
            self.base_url,
            req.pair.symbol(),
            req.interval,
            req.start.timestamp_millis(),
            req.end.timestamp_millis(),
            req.limit
        )
    }

    /// Parse a klines response body into price points.
    pub fn parse_klines(req: &PageRequest, body: &str) -> Result<Vec<PricePoint>, DataError> {
        let rows: Vec<Vec<Value>> = serde_json::from_str(body)
            .map_err(|e| req.parse_error(format!("expected an array of kline arrays: {e}")))?;

        let mut points: Vec<PricePoint> = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() <= CLOSE_TIME_POS {
                return Err(req.parse_error(format!(
                    "record {i} has {} fields, expected at least {}",
                    row.len(),
                    CLOSE_TIME_POS + 1
                )));
            }

            let close_time = row[CLOSE_TIME_POS].as_i64().ok_or_else(|| {
                req.parse_error(format!("record {i}: close time is not an integer"))
            })?;
            let timestamp = close_time_to_timestamp(close_time).ok_or_else(|| {
                req.parse_error(format!("record {i}: close time {close_time} out of range"))
            })?;

            if let Some(prev) = points.last() {
                if prev.timestamp > timestamp {
                    return Err(req.parse_error(format!(
                        "record {i}: timestamps out of order ({} after {})",
                        timestamp, prev.timestamp
                    )));
                }
            }

            let decimal_at = |pos: usize, name: &str| {
                decimal_value(&row[pos])
                    .ok_or_else(|| req.parse_error(format!("record {i}: {name} is not a decimal")))
            };

            points.push(PricePoint {
                timestamp,
                open: decimal_at(1, "open")?,
                high: decimal_at(2, "high")?,
                low: decimal_at(3, "low")?,
                close: decimal_at(4, "close")?,
                volume: decimal_at(5, "volume")?,
            });
        }

        Ok(points)
    }
}

/// Derive a record timestamp from the exchange close time (ms since epoch).
///
/// Truncates to whole seconds and adds one second: a candle closing at
/// `00:59:59.999` lands on `01:00:00`, the slot of the next interval.
pub fn close_time_to_timestamp(close_time_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(close_time_ms.div_euclid(1000) + 1, 0)
}

/// Decimal from a JSON string (`"42000.01"`) or number.
fn decimal_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Human-readable reason for a non-success response.
fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => format!("HTTP {status}: {} (code {})", err.msg, err.code),
        Err(_) => {
            let snippet: String = body.chars().take(200).collect();
            format!("HTTP {status}: {snippet}")
        }
    }
}

fn validate(req: &PageRequest) -> Result<(), DataError> {
    if req.start > req.end {
        return Err(DomainError::InvalidRange {
            start: req.start,
            end: req.end,
        }
        .into());
    }
    if req.limit == 0 || req.limit > MAX_PAGE_LIMIT {
        return Err(DomainError::InvalidPageLimit {
            got: req.limit,
            max: MAX_PAGE_LIMIT,
        }
        .into());
    }
    Ok(())
}

impl KlineProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<PricePoint>, DataError> {
        validate(request)?;

        let url = self.klines_url(request);
        debug!(
            pair = %request.pair,
            interval = %request.interval,
            start = %request.start,
            end = %request.end,
            limit = request.limit,
            "requesting klines"
        );

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                request.fetch_error(format!("request timed out: {e}"))
            } else {
                request.fetch_error(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| request.fetch_error(format!("reading response body: {e}")))?;

        if !status.is_success() {
            return Err(request.fetch_error(describe_status(status, &body)));
        }

        let points = Self::parse_klines(request, &body)?;
        debug!(pair = %request.pair, rows = points.len(), "klines received");
        Ok(points)
    }
}
