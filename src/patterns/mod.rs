// src/patterns/mod.rs
// Reversal candlestick recognizers, scanned in priority order per zone polarity.

use crate::types::{Candle, Direction, Polarity};

// Trait for pattern recognizers
pub trait PatternRecognizer {
    fn label(&self) -> &'static str;
    fn direction(&self) -> Direction;
    /// `candles` are oldest first; the last one is the candle under test.
    fn detect(&self, candles: &[Candle]) -> bool;
}

mod doji;
mod engulfing;
mod hammer;
mod pin_bar;
mod star;

pub use doji::DojiRecognizer;
pub use engulfing::EngulfingRecognizer;
pub use hammer::HammerRecognizer;
pub use pin_bar::PinBarRecognizer;
pub use star::StarRecognizer;

/// Fewest candles a scan needs.
pub const MIN_PATTERN_CANDLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub direction: Direction,
    pub label: &'static str,
}

/// Last `n` candles, or `None` when the slice is shorter.
pub(crate) fn tail(candles: &[Candle], n: usize) -> Option<&[Candle]> {
    candles.len().checked_sub(n).map(|start| &candles[start..])
}

type Recognizers = Vec<Box<dyn PatternRecognizer + Send + Sync>>;

pub struct PatternMatcher {
    demand: Recognizers,
    supply: Recognizers,
}

impl PatternMatcher {
    pub fn new(use_doji: bool) -> Self {
        Self {
            demand: Self::recognizers(Polarity::Demand, use_doji),
            supply: Self::recognizers(Polarity::Supply, use_doji),
        }
    }

    fn recognizers(polarity: Polarity, use_doji: bool) -> Recognizers {
        let side = polarity.reversal_direction();
        let mut list: Recognizers = vec![
            Box::new(EngulfingRecognizer::new(side)),
            Box::new(HammerRecognizer::new(side)),
            Box::new(PinBarRecognizer::new(side)),
            Box::new(StarRecognizer::new(side)),
        ];
        if use_doji {
            list.push(Box::new(DojiRecognizer::new(side)));
        }
        list
    }

    /// First recognizer that fires for the zone's polarity wins.
    pub fn scan(&self, candles: &[Candle], polarity: Polarity) -> Option<PatternMatch> {
        if candles.len() < MIN_PATTERN_CANDLES {
            return None;
        }
        let recognizers = match polarity {
            Polarity::Demand => &self.demand,
            Polarity::Supply => &self.supply,
        };
        recognizers
            .iter()
            .find(|r| r.detect(candles))
            .map(|r| PatternMatch {
                direction: r.direction(),
                label: r.label(),
            })
    }
}

impl std::fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels = |list: &Recognizers| -> Vec<&'static str> {
            list.iter().map(|r| r.label()).collect()
        };
        f.debug_struct("PatternMatcher")
            .field("demand", &labels(&self.demand))
            .field("supply", &labels(&self.supply))
            .finish()
    }
}
