//! Paginator: splits a time range into exchange-sized pages.
//!
//! Each page spans `page_limit × interval`. Pages are fetched strictly in
//! increasing time order and concatenated as-is: consecutive pages share a
//! boundary candle, and those duplicates are left for the cache writer to
//! drop.

use super::provider::{DataError, KlineProvider, PageRequest};
use crate::domain::{DomainError, Interval, Series, TimeRange, TradingPair};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// One planned request window, closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Drives a [`KlineProvider`] over an arbitrary range.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    interval: Interval,
    page_limit: u32,
}

impl Paginator {
    pub fn new(interval: Interval, page_limit: u32) -> Result<Self, DomainError> {
        if page_limit == 0 || i32::try_from(page_limit).is_err() {
            return Err(DomainError::InvalidPageLimit {
                got: page_limit,
                max: i32::MAX as u32,
            });
        }
        Ok(Self {
            interval,
            page_limit,
        })
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Time covered by one full page.
    pub fn page_span(&self) -> Duration {
        // page_limit fits in i32, checked in new()
        self.interval.duration() * self.page_limit as i32
    }

    /// Request windows for `range`, produced one at a time.
    ///
    /// Full pages `[cursor, cursor + span]` are emitted while they fit inside
    /// the range, then one trailing window `[cursor, end]` picks up the
    /// remainder. A range shorter than one page yields only the trailing
    /// window.
    pub fn windows(&self, range: &TimeRange) -> PageWindows {
        PageWindows {
            span: self.page_span(),
            cursor: range.start(),
            end: range.end(),
            done: false,
        }
    }

    /// Plan every request window for `range` without fetching.
    pub fn plan_windows(&self, range: &TimeRange) -> Vec<PageWindow> {
        self.windows(range).collect()
    }

    /// Fetch every planned window for `pair` and concatenate the results.
    ///
    /// The first failing page aborts the whole collection; no partial series
    /// is returned.
    pub fn collect(
        &self,
        provider: &dyn KlineProvider,
        pair: &TradingPair,
        range: &TimeRange,
    ) -> Result<Series, DataError> {
        let mut series = Series::new();
        let mut pages = 0usize;

        for window in self.windows(range) {
            let request = PageRequest {
                pair: pair.clone(),
                interval: self.interval,
                start: window.start,
                end: window.end,
                limit: self.page_limit,
            };
            let page = provider.fetch_page(&request)?;
            pages += 1;
            debug!(
                pair = %pair,
                page = pages,
                start = %window.start,
                end = %window.end,
                rows = page.len(),
                "page fetched"
            );
            series.extend(page);
        }

        info!(
            pair = %pair,
            provider = provider.name(),
            pages,
            rows = series.len(),
            "range collected"
        );
        Ok(series)
    }
}

/// Iterator returned by [`Paginator::windows`].
#[derive(Debug, Clone)]
pub struct PageWindows {
    span: Duration,
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    done: bool,
}

impl Iterator for PageWindows {
    type Item = PageWindow;

    fn next(&mut self) -> Option<PageWindow> {
        if self.done {
            return None;
        }
        let start = self.cursor;
        match start
            .checked_add_signed(self.span)
            .filter(|end| *end <= self.end)
        {
            Some(end) => {
                self.cursor = end;
                Some(PageWindow { start, end })
            }
            None => {
                self.done = true;
                Some(PageWindow {
                    start,
                    end: self.end,
                })
            }
        }
    }
}
