//! Domain types for klinecache

pub mod field;
pub mod interval;
pub mod pair;
pub mod price_point;
pub mod range;

pub use field::Field;
pub use interval::Interval;
pub use pair::{normalize_symbol, TradingPair};
pub use price_point::{PricePoint, Series};
pub use range::{parse_utc, TimeRange};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Invalid input to a domain constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("unsupported interval '{0}'")]
    UnknownInterval(String),

    #[error("unknown field '{0}' (expected one of: open, high, low, close, volume)")]
    UnknownField(String),

    #[error("empty symbol")]
    EmptySymbol,

    #[error("invalid symbol '{0}' (expected ASCII letters and digits only)")]
    InvalidSymbol(String),

    #[error("page limit must be between 1 and {max}, got {got}")]
    InvalidPageLimit { got: u32, max: u32 },

    #[error("no assets requested")]
    EmptyAssetList,

    #[error("no fields requested")]
    EmptyFieldList,

    #[error("unparseable timestamp '{0}' (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    InvalidTimestamp(String),
}
