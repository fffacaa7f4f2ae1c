// src/patterns/pin_bar.rs
use crate::patterns::{tail, PatternRecognizer};
use crate::types::{Candle, Direction};

/// Pin bar: the rejection wick covers at least 66% of the range and the
/// opposite wick no more than 15%.
pub struct PinBarRecognizer {
    side: Direction,
}

impl PinBarRecognizer {
    pub fn new(side: Direction) -> Self {
        Self { side }
    }
}

impl PatternRecognizer for PinBarRecognizer {
    fn label(&self) -> &'static str {
        match self.side {
            Direction::Up => "Bullish Pin Bar",
            Direction::Down => "Bearish Pin Bar",
        }
    }

    fn direction(&self) -> Direction {
        self.side
    }

    fn detect(&self, candles: &[Candle]) -> bool {
        let Some([candle]) = tail(candles, 1) else {
            return false;
        };
        let range = candle.range();
        if range == 0.0 {
            return false;
        }
        let (rejection, opposite) = match self.side {
            Direction::Up => (candle.lower_wick(), candle.upper_wick()),
            Direction::Down => (candle.upper_wick(), candle.lower_wick()),
        };
        rejection / range >= 0.66 && opposite / range <= 0.15
    }
}
