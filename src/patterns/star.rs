// src/patterns/star.rs
use crate::patterns::{tail, PatternRecognizer};
use crate::types::{Candle, Direction};

/// Three-candle morning star (up) / evening star (down): a large candle
/// against the trade, a small-bodied pause, then a strong reversal candle
/// closing beyond the first candle's midpoint.
pub struct StarRecognizer {
    side: Direction,
}

impl StarRecognizer {
    pub fn new(side: Direction) -> Self {
        Self { side }
    }
}

impl PatternRecognizer for StarRecognizer {
    fn label(&self) -> &'static str {
        match self.side {
            Direction::Up => "Morning Star",
            Direction::Down => "Evening Star",
        }
    }

    fn direction(&self) -> Direction {
        self.side
    }

    fn detect(&self, candles: &[Candle]) -> bool {
        let Some([first, middle, last]) = tail(candles, 3) else {
            return false;
        };
        let first_body = first.body();
        if first_body == 0.0 {
            return false;
        }
        let first_mid = (first.open + first.close) / 2.0;
        let small_middle = middle.body() < first_body * 0.4;
        let strong_last = last.body() > first_body * 0.5;

        match self.side {
            Direction::Up => {
                first.is_bearish()
                    && small_middle
                    && last.is_bullish()
                    && strong_last
                    && last.close > first_mid
            }
            Direction::Down => {
                first.is_bullish()
                    && small_middle
                    && last.is_bearish()
                    && strong_last
                    && last.close < first_mid
            }
        }
    }
}
