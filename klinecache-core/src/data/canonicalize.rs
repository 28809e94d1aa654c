use crate::domain::Interval;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema::SeriesSchema;

/// Canonicalizer for series frames
pub struct Canonicalizer;

impl Canonicalizer {
    /// Canonicalize a series frame: stable sort by timestamp, then drop
    /// repeated timestamps keeping the first row in arrival order.
    ///
    /// Pagination overlap means the same candle can arrive twice; the copy
    /// from the earlier page wins.
    pub fn canonicalize(df: LazyFrame) -> LazyFrame {
        df.sort(
            [SeriesSchema::KEY_COLUMN],
            SortMultipleOptions::default()
                .with_order_descending(false)
                .with_maintain_order(true),
        )
        .unique_stable(
            Some(vec![SeriesSchema::KEY_COLUMN.into()]),
            UniqueKeepStrategy::First,
        )
    }

    /// Find missing interval slots in an ascending, duplicate-free series.
    pub fn detect_gaps(timestamps: &[DateTime<Utc>], interval: Interval) -> Vec<GapReport> {
        let step = interval.duration();
        timestamps
            .windows(2)
            .filter_map(|w| {
                let delta = w[1] - w[0];
                if delta > step {
                    Some(GapReport {
                        after: w[0],
                        before: w[1],
                        missing: (delta.num_seconds() / step.num_seconds() - 1) as usize,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// A run of missing candles between two cached rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
    pub missing: usize,
}
