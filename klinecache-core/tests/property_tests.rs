//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Plan shape: windows are contiguous and cover exactly [start, end]
//! 2. Pagination completeness: every candle in range is fetched, none outside
//! 3. Dedup: one row per distinct timestamp, first arrival wins

use chrono::{DateTime, Duration, TimeZone, Utc};
use klinecache_core::data::{CsvCache, Paginator, SyntheticProvider};
use klinecache_core::domain::{Interval, PricePoint, TimeRange, TradingPair};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// Ranges starting on arbitrary minutes, up to ~10 days long.
fn arb_range() -> impl Strategy<Value = TimeRange> {
    (0i64..600, 0i64..14_400).prop_map(|(offset_min, len_min)| {
        let start = origin() + Duration::minutes(offset_min);
        TimeRange::new(start, start + Duration::minutes(len_min)).unwrap()
    })
}

fn arb_limit() -> impl Strategy<Value = u32> {
    1u32..=25
}

/// Hourly open times of every candle the exchange would serve for `range`.
fn expected_timestamps(range: &TimeRange) -> BTreeSet<DateTime<Utc>> {
    let step = Interval::OneHour.duration();
    let step_ms = step.num_milliseconds();
    let start_ms = range.start().timestamp_millis();
    let mut open_ms = start_ms.div_euclid(step_ms) * step_ms;
    if open_ms < start_ms {
        open_ms += step_ms;
    }
    let mut out = BTreeSet::new();
    while open_ms <= range.end().timestamp_millis() {
        out.insert(DateTime::from_timestamp_millis(open_ms).unwrap() + step);
        open_ms += step_ms;
    }
    out
}

// ── 1. Plan Shape ────────────────────────────────────────────────────

proptest! {
    /// Windows chain end-to-start and span exactly the requested range.
    #[test]
    fn plan_covers_range_contiguously(range in arb_range(), limit in arb_limit()) {
        let paginator = Paginator::new(Interval::OneHour, limit).unwrap();
        let windows = paginator.plan_windows(&range);

        prop_assert!(!windows.is_empty());
        prop_assert_eq!(windows[0].start, range.start());
        prop_assert_eq!(windows.last().unwrap().end, range.end());
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for w in &windows {
            prop_assert!(w.start <= w.end);
            prop_assert!(w.end - w.start <= paginator.page_span());
        }
    }
}

// ── 2. Pagination Completeness ───────────────────────────────────────

proptest! {
    /// With an exchange that caps every page at `limit`, the deduplicated
    /// result holds exactly the candles whose open time lies in the range.
    #[test]
    fn pagination_has_no_gaps(range in arb_range(), limit in arb_limit()) {
        let paginator = Paginator::new(Interval::OneHour, limit).unwrap();
        let provider = SyntheticProvider::new(Interval::OneHour);
        let pair = TradingPair::new("BTC", "USDT").unwrap();

        let series = paginator.collect(&provider, &pair, &range).unwrap();
        let got: BTreeSet<_> = series.iter().map(|p| p.timestamp).collect();

        prop_assert_eq!(got, expected_timestamps(&range));
        for w in series.windows(2) {
            prop_assert!(w[0].timestamp <= w[1].timestamp);
        }
    }
}

// ── 3. Dedup ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Writing any arrival sequence keeps one row per timestamp, the first
    /// one seen, in ascending order.
    #[test]
    fn write_keeps_first_arrival(arrivals in prop::collection::vec((0i64..40, 1i64..100_000), 0..80)) {
        let series: Vec<PricePoint> = arrivals
            .iter()
            .map(|(h, cents)| {
                let price = Decimal::new(*cents, 2);
                PricePoint {
                    timestamp: origin() + Duration::hours(*h),
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: Decimal::ONE,
                }
            })
            .collect();

        let mut first: BTreeMap<DateTime<Utc>, Decimal> = BTreeMap::new();
        for p in &series {
            first.entry(p.timestamp).or_insert(p.close);
        }

        let dir = tempfile::tempdir().unwrap();
        let cache = CsvCache::new(dir.path());
        let pair = TradingPair::new("ETH", "USDT").unwrap();
        let report = cache.write(&pair, Interval::OneHour, &series).unwrap();
        prop_assert_eq!(report.rows_written, first.len());

        let loaded = cache.read_series("ETH").unwrap();
        let got: Vec<_> = loaded.iter().map(|p| (p.timestamp, p.close)).collect();
        let want: Vec<_> = first.into_iter().collect();
        prop_assert_eq!(got, want);
    }
}
