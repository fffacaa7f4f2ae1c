// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One OHLC bar. `time` is the bar open time in epoch seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.body_top()
    }

    pub fn lower_wick(&self) -> f64 {
        self.body_bottom() - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Which of the two series a candle belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// Zone timeframe (M15 by default).
    Long,
    /// Signal timeframe (M1 by default).
    Short,
}

impl Timeframe {
    /// Maps a venue granularity in seconds onto the configured timeframes.
    pub fn from_granularity(seconds: u32, long_secs: u32, short_secs: u32) -> Option<Self> {
        if seconds == long_secs {
            Some(Timeframe::Long)
        } else if seconds == short_secs {
            Some(Timeframe::Short)
        } else {
            None
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Long => write!(f, "long"),
            Timeframe::Short => write!(f, "short"),
        }
    }
}

/// Side of a zone: demand zones sit under price, supply zones above it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Demand,
    Supply,
}

impl Polarity {
    /// Direction a reversal off this zone would trade.
    pub fn reversal_direction(&self) -> Direction {
        match self {
            Polarity::Demand => Direction::Up,
            Polarity::Supply => Direction::Down,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Demand => write!(f, "demand"),
            Polarity::Supply => write!(f, "supply"),
        }
    }
}

/// Trade direction. Serialised with the venue's contract type names.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "CALL")]
    Up,
    #[serde(rename = "PUT")]
    Down,
}

impl Direction {
    pub fn contract_type(&self) -> &'static str {
        match self {
            Direction::Up => "CALL",
            Direction::Down => "PUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_geometry() {
        let candle = Candle::new(0, 10.0, 14.0, 7.0, 12.0);
        assert_eq!(candle.body(), 2.0);
        assert_eq!(candle.range(), 7.0);
        assert_eq!(candle.upper_wick(), 2.0);
        assert_eq!(candle.lower_wick(), 3.0);
        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
    }

    #[test]
    fn test_timeframe_from_granularity() {
        assert_eq!(Timeframe::from_granularity(900, 900, 60), Some(Timeframe::Long));
        assert_eq!(Timeframe::from_granularity(60, 900, 60), Some(Timeframe::Short));
        assert_eq!(Timeframe::from_granularity(300, 900, 60), None);
    }

    #[test]
    fn test_direction_serialises_as_contract_type() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"CALL\"");
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"PUT\"");
        assert_eq!(Polarity::Supply.reversal_direction(), Direction::Down);
    }
}
