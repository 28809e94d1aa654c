//! Candlestick sampling granularity.

use super::DomainError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kline interval supported by the exchange.
///
/// Only fixed-length intervals are modelled; the calendar-month interval has
/// no constant duration and would break page-span arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "8h")]
    EightHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    pub const ALL: [Interval; 14] = [
        Interval::OneMinute,
        Interval::ThreeMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::TwoHours,
        Interval::FourHours,
        Interval::SixHours,
        Interval::EightHours,
        Interval::TwelveHours,
        Interval::OneDay,
        Interval::ThreeDays,
        Interval::OneWeek,
    ];

    /// Exchange wire representation (`1h`, `1d`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::SixHours => "6h",
            Interval::EightHours => "8h",
            Interval::TwelveHours => "12h",
            Interval::OneDay => "1d",
            Interval::ThreeDays => "3d",
            Interval::OneWeek => "1w",
        }
    }

    /// Length of one candle.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::OneMinute => Duration::minutes(1),
            Interval::ThreeMinutes => Duration::minutes(3),
            Interval::FiveMinutes => Duration::minutes(5),
            Interval::FifteenMinutes => Duration::minutes(15),
            Interval::ThirtyMinutes => Duration::minutes(30),
            Interval::OneHour => Duration::hours(1),
            Interval::TwoHours => Duration::hours(2),
            Interval::FourHours => Duration::hours(4),
            Interval::SixHours => Duration::hours(6),
            Interval::EightHours => Duration::hours(8),
            Interval::TwelveHours => Duration::hours(12),
            Interval::OneDay => Duration::days(1),
            Interval::ThreeDays => Duration::days(3),
            Interval::OneWeek => Duration::weeks(1),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| DomainError::UnknownInterval(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        for interval in Interval::ALL {
            let parsed: Interval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, interval);
            assert_eq!(parsed.to_string(), interval.as_str());
        }
    }

    #[test]
    fn hourly_duration() {
        assert_eq!(Interval::OneHour.duration(), Duration::seconds(3600));
        assert_eq!(Interval::OneWeek.duration(), Duration::days(7));
    }

    #[test]
    fn monthly_is_rejected() {
        assert_eq!(
            "1M".parse::<Interval>(),
            Err(DomainError::UnknownInterval("1M".into()))
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Interval::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let back: Interval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(back, Interval::FifteenMinutes);
    }
}
