//! Data acquisition, caching and alignment

pub mod align;
pub mod binance;
pub mod cache;
pub mod canonicalize;
pub mod download;
pub mod paginate;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod synthetic;

pub use align::{load_aligned, AlignedTable, AssetFrame};
pub use binance::BinanceProvider;
pub use cache::{CacheMeta, CacheStatus, CsvCache, WriteReport};
pub use canonicalize::{Canonicalizer, GapReport};
pub use download::{download_assets, DownloadError, DownloadSummary};
pub use paginate::{PageWindow, PageWindows, Paginator};
pub use provider::{
    DataError, DownloadProgress, KlineProvider, PageRequest, StdoutProgress, StorageErrorKind,
};
pub use retry::{RetryPolicy, RetryingProvider};
pub use schema::SeriesSchema;
pub use synthetic::SyntheticProvider;
