use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A market identified by base and quote asset (BTC + USDT).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    /// Build a pair; symbols are trimmed and upper-cased.
    pub fn new(base: &str, quote: &str) -> Result<Self, DomainError> {
        Ok(Self {
            base: normalize_symbol(base)?,
            quote: normalize_symbol(quote)?,
        })
    }

    /// Exchange symbol: plain concatenation of base and quote.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

/// Trim and upper-case an asset symbol.
///
/// Exchange symbols are ASCII alphanumeric. The base symbol also names the
/// cache artifact, so anything else (path separators, dots) is rejected.
pub fn normalize_symbol(raw: &str) -> Result<String, DomainError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(DomainError::EmptySymbol);
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidSymbol(raw.trim().to_string()));
    }
    Ok(symbol)
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_concatenation() {
        let pair = TradingPair::new("btc", "usdt").unwrap();
        assert_eq!(pair.symbol(), "BTCUSDT");
        assert_eq!(pair.base, "BTC");
        assert_eq!(pair.to_string(), "BTCUSDT");
    }

    #[test]
    fn empty_symbol_rejected() {
        assert_eq!(TradingPair::new(" ", "USDT"), Err(DomainError::EmptySymbol));
        assert_eq!(TradingPair::new("ETH", ""), Err(DomainError::EmptySymbol));
    }

    #[test]
    fn path_like_symbols_rejected() {
        for raw in ["../x", "BTC/ETH", "a\\b", ".", "BTC.csv", "BTC USD"] {
            assert!(
                matches!(TradingPair::new(raw, "USDT"), Err(DomainError::InvalidSymbol(_))),
                "{raw} accepted"
            );
        }
        assert!(matches!(
            TradingPair::new("BTC", "US/DT"),
            Err(DomainError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn normalize_symbol_accepts_alphanumerics() {
        assert_eq!(normalize_symbol(" 1inch ").unwrap(), "1INCH");
    }
}
