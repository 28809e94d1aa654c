//! Deterministic offline kline provider.
//!
//! Emulates the exchange's paging semantics: candles open on an epoch-anchored
//! grid, every candle whose open time lies in `[start, end]` qualifies, and at
//! most `limit` of them are returned, oldest first. Prices are a fixed
//! function of the pair and the open time, so repeated runs are identical.
//!
//! Used for `--synthetic` dry runs and as the test double for the paginator.
//! Synthetic data is clearly fake and never a substitute for a real download.

use super::binance::close_time_to_timestamp;
use super::provider::{DataError, KlineProvider, PageRequest};
use crate::domain::{Interval, PricePoint};
use rust_decimal::Decimal;
use std::sync::Mutex;

pub struct SyntheticProvider {
    interval: Interval,
    cap_to_limit: bool,
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<PageRequest>>,
}

impl SyntheticProvider {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            cap_to_limit: true,
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Return every qualifying candle, ignoring `limit`.
    pub fn uncapped(mut self) -> Self {
        self.cap_to_limit = false;
        self
    }

    /// Fail the zero-based `n`th call with a fetch error.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn candle(&self, pair_seed: i64, open_ms: i64, step_ms: i64) -> Option<PricePoint> {
        let k = open_ms.div_euclid(step_ms);
        let base = 100 + pair_seed;
        // price in cents
        let close_c = base * 100 + (k * 7919).rem_euclid(400);
        let open_c = base * 100 + ((k - 1) * 7919).rem_euclid(400);
        let high_c = close_c.max(open_c) + 25;
        let low_c = close_c.min(open_c) - 25;

        Some(PricePoint {
            timestamp: close_time_to_timestamp(open_ms + step_ms - 1)?,
            open: Decimal::new(open_c, 2),
            high: Decimal::new(high_c, 2),
            low: Decimal::new(low_c, 2),
            close: Decimal::new(close_c, 2),
            volume: Decimal::new(1_000 + k.rem_euclid(500), 3),
        })
    }
}

fn pair_seed(symbol: &str) -> i64 {
    let hash = blake3::hash(symbol.as_bytes());
    let bytes = hash.as_bytes();
    i64::from(u16::from_le_bytes([bytes[0], bytes[1]]) % 900)
}

impl KlineProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<PricePoint>, DataError> {
        let call = {
            let mut requests = self
                .requests
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            requests.push(request.clone());
            requests.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(request.fetch_error("synthetic failure"));
        }
        if request.interval != self.interval {
            return Err(request.parse_error(format!(
                "synthetic provider serves {} candles, asked for {}",
                self.interval, request.interval
            )));
        }

        let step_ms = self.interval.duration().num_milliseconds();
        let start_ms = request.start.timestamp_millis();
        let end_ms = request.end.timestamp_millis();
        let seed = pair_seed(&request.pair.symbol());

        let mut open_ms = start_ms.div_euclid(step_ms) * step_ms;
        if open_ms < start_ms {
            open_ms += step_ms;
        }

        let mut points = Vec::new();
        while open_ms <= end_ms {
            if self.cap_to_limit && points.len() >= request.limit as usize {
                break;
            }
            let point = self
                .candle(seed, open_ms, step_ms)
                .ok_or_else(|| request.parse_error(format!("open time {open_ms} out of range")))?;
            points.push(point);
            open_ms += step_ms;
        }

        Ok(points)
    }
}
