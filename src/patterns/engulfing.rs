// src/patterns/engulfing.rs
use crate::patterns::{tail, PatternRecognizer};
use crate::types::{Candle, Direction};

/// Two-candle engulfing reversal: the current body swallows the prior
/// opposite-coloured body and is at least 80% of its size.
pub struct EngulfingRecognizer {
    side: Direction,
}

const MIN_BODY_RATIO: f64 = 0.8;

impl EngulfingRecognizer {
    pub fn new(side: Direction) -> Self {
        Self { side }
    }
}

impl PatternRecognizer for EngulfingRecognizer {
    fn label(&self) -> &'static str {
        match self.side {
            Direction::Up => "Bullish Engulfing",
            Direction::Down => "Bearish Engulfing",
        }
    }

    fn direction(&self) -> Direction {
        self.side
    }

    fn detect(&self, candles: &[Candle]) -> bool {
        let Some([prior, current]) = tail(candles, 2) else {
            return false;
        };
        let prior_body = prior.body();
        let current_body = current.body();
        if prior_body == 0.0 || current_body == 0.0 {
            return false;
        }

        let engulfs = match self.side {
            Direction::Up => {
                prior.is_bearish()
                    && current.is_bullish()
                    && current.open <= prior.close
                    && current.close >= prior.open
            }
            Direction::Down => {
                prior.is_bullish()
                    && current.is_bearish()
                    && current.open >= prior.close
                    && current.close <= prior.open
            }
        };
        engulfs && current_body >= prior_body * MIN_BODY_RATIO
    }
}
