//! PricePoint: one candlestick of one asset.

use super::Field;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One candlestick, keyed by its derived timestamp.
///
/// The timestamp is the candle's close time truncated to whole seconds plus
/// one second, i.e. the open of the following interval. `close` is the value
/// the return statistics consume; the other prices travel with it so a load
/// can project any subset of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PricePoint {
    pub fn value(&self, field: Field) -> Decimal {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::Volume => self.volume,
        }
    }
}

/// Ordered sequence of price points for one asset.
pub type Series = Vec<PricePoint>;
