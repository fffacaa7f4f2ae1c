// src/patterns/doji.rs
use crate::patterns::{tail, PatternRecognizer};
use crate::types::{Candle, Direction};

/// Near-bodiless candle (body under 15% of range) whose wick on the
/// rejection side covers more than 45% of the range.
pub struct DojiRecognizer {
    side: Direction,
}

impl DojiRecognizer {
    pub fn new(side: Direction) -> Self {
        Self { side }
    }
}

impl PatternRecognizer for DojiRecognizer {
    fn label(&self) -> &'static str {
        match self.side {
            Direction::Up => "Bullish Doji",
            Direction::Down => "Bearish Doji",
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
        if range == 0.0 || candle.body() / range >= 0.15 {
            return false;
        }
        let rejection = match self.side {
            Direction::Up => candle.lower_wick(),
            Direction::Down => candle.upper_wick(),
        };
        rejection / range > 0.45
    }
}
