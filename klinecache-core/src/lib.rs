//! klinecache core: domain types, configuration and the kline data pipeline.
//!
//! - Domain types (trading pairs, intervals, time ranges, price points)
//! - Binance kline fetcher behind the `KlineProvider` trait
//! - Paginator splitting a range into exchange-sized pages
//! - CSV cache with first-wins deduplication and a metadata sidecar
//! - Multi-asset loader producing a union-aligned table
//! - Retry decorator and sequential multi-asset download

pub mod config;
pub mod data;
pub mod domain;

pub use config::{ConfigError, PipelineConfig};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types can move across threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PricePoint>();
        require_sync::<domain::PricePoint>();
        require_send::<domain::TimeRange>();
        require_sync::<domain::TimeRange>();
        require_send::<domain::TradingPair>();
        require_sync::<domain::TradingPair>();

        // Data types
        require_send::<data::AlignedTable>();
        require_sync::<data::AlignedTable>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::CsvCache>();
        require_sync::<data::CsvCache>();
        require_send::<data::BinanceProvider>();
        require_sync::<data::BinanceProvider>();
        require_send::<data::RetryingProvider<data::BinanceProvider>>();
        require_sync::<data::RetryingProvider<data::BinanceProvider>>();

        require_send::<PipelineConfig>();
        require_sync::<PipelineConfig>();
    }

    /// Providers are usable as trait objects.
    #[test]
    fn providers_are_object_safe() {
        let synthetic = data::SyntheticProvider::new(domain::Interval::OneHour);
        let providers: Vec<&dyn data::KlineProvider> = vec![&synthetic];
        assert_eq!(providers[0].name(), "synthetic");
    }
}
