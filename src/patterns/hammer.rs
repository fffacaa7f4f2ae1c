// src/patterns/hammer.rs
use crate::patterns::{tail, PatternRecognizer};
use crate::types::{Candle, Direction};

/// Hammer (up) and shooting star (down): a small body at one end of the
/// range with a rejection wick at least twice the body.
pub struct HammerRecognizer {
    side: Direction,
}

impl HammerRecognizer {
    pub fn new(side: Direction) -> Self {
        Self { side }
    }
}

impl PatternRecognizer for HammerRecognizer {
    fn label(&self) -> &'static str {
        match self.side {
            Direction::Up => "Hammer",
            Direction::Down => "Shooting Star",
        }
    }

    fn direction(&self) -> Direction {
        self.side
    }

    fn detect(&self, candles: &[Candle]) -> bool {
        let Some([candle]) = tail(candles, 1) else {
            return false;
        };
        let body = candle.body();
        let range = candle.range();
        if range == 0.0 || body == 0.0 {
            return false;
        }

        let (rejection, opposite) = match self.side {
            Direction::Up => (candle.lower_wick(), candle.upper_wick()),
            Direction::Down => (candle.upper_wick(), candle.lower_wick()),
        };
        rejection >= body * 2.0 && opposite <= body * 0.5 && body / range < 0.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hammer() {
        let r = HammerRecognizer::new(Direction::Up);
        assert!(r.detect(&[Candle::new(0, 10.0, 10.25, 9.0, 10.2)]));
        assert!(!r.detect(&[Candle::new(0, 10.0, 11.0, 9.0, 10.2)]));
    }

    #[test]
    fn test_shooting_star() {
        let r = HammerRecognizer::new(Direction::Down);
        assert!(r.detect(&[Candle::new(0, 10.2, 11.2, 9.95, 10.0)]));
        assert!(!r.detect(&[Candle::new(0, 10.0, 10.25, 9.0, 10.2)]));
    }

    #[test]
    fn test_flat_candle_never_fires() {
        let flat = [Candle::new(0, 10.0, 10.0, 10.0, 10.0)];
        assert!(!HammerRecognizer::new(Direction::Up).detect(&flat));
        assert!(!HammerRecognizer::new(Direction::Down).detect(&flat));
    }
}
