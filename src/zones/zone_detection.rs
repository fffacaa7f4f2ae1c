// src/zones/zone_detection.rs
// Pivot-based supply/demand zone detection over the long-timeframe series.

use crate::config::BotConfig;
use crate::types::{Candle, Polarity};
use crate::zones::zone::Zone;
use log::debug;

/// Below this many candles there is not enough history for pivots.
pub const MIN_CANDLES: usize = 50;

/// Zones thinner than this are considered degenerate.
const DEGENERATE_HEIGHT: f64 = 1e-5;

/// Amount a degenerate zone's body-side boundary is pushed out by.
pub const ZONE_WIDEN: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pivot {
    is_high: bool,
    is_low: bool,
}

#[derive(Debug, Clone)]
pub struct ZoneDetector {
    depth: usize,
    backstep: usize,
}

impl ZoneDetector {
    pub fn new(depth: usize, backstep: usize) -> Self {
        Self { depth, backstep }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.pivot_depth, config.pivot_backstep)
    }

    /// Recomputes every zone in `candles` (oldest first). Returns an empty set
    /// while history is shorter than [`MIN_CANDLES`].
    pub fn compute(&self, candles: &[Candle]) -> Vec<Zone> {
        let count = candles.len();
        let mut zones: Vec<Zone> = Vec::new();
        if count < MIN_CANDLES || self.depth == 0 {
            return zones;
        }

        let end = count.saturating_sub(self.backstep);
        for i in self.depth..end {
            let pivot = self.classify(candles, i);

            if pivot.is_high {
                let zone = self.supply_zone(candles, i);
                self.push_unique(&mut zones, zone);
            }
            if pivot.is_low {
                let zone = self.demand_zone(candles, i);
                self.push_unique(&mut zones, zone);
            }
        }

        debug!(
            "[ZoneDetector] {} zones ({} active) from {} candles",
            zones.len(),
            zones.iter().filter(|z| z.is_active()).count(),
            count
        );
        zones
    }

    /// Tests candle `i` against `depth` neighbours on both sides, bailing out
    /// once it can be neither a high nor a low pivot.
    fn classify(&self, candles: &[Candle], i: usize) -> Pivot {
        let mut pivot = Pivot {
            is_high: true,
            is_low: true,
        };
        let center = &candles[i];

        for j in 1..=self.depth {
            let (left, right) = match (i.checked_sub(j), candles.get(i + j)) {
                (Some(l), Some(right)) => (&candles[l], right),
                _ => {
                    return Pivot {
                        is_high: false,
                        is_low: false,
                    }
                }
            };

            if center.high < left.high || center.high < right.high {
                pivot.is_high = false;
            }
            if center.low > left.low || center.low > right.low {
                pivot.is_low = false;
            }
            if !pivot.is_high && !pivot.is_low {
                break;
            }
        }
        pivot
    }

    fn supply_zone(&self, candles: &[Candle], i: usize) -> Zone {
        let pivot = &candles[i];
        let high = pivot.high;
        let mut low = pivot.body_top();
        if high - low < DEGENERATE_HEIGHT {
            low = high - ZONE_WIDEN;
        }
        let mut zone = Zone::new(high, low, Polarity::Supply, pivot.time);
        zone.broken_at = Self::first_break(&zone, &candles[i + 1..]);
        zone
    }

    fn demand_zone(&self, candles: &[Candle], i: usize) -> Zone {
        let pivot = &candles[i];
        let low = pivot.low;
        let mut high = pivot.body_bottom();
        if high - low < DEGENERATE_HEIGHT {
            high = low + ZONE_WIDEN;
        }
        let mut zone = Zone::new(high, low, Polarity::Demand, pivot.time);
        zone.broken_at = Self::first_break(&zone, &candles[i + 1..]);
        zone
    }

    fn first_break(zone: &Zone, later: &[Candle]) -> Option<i64> {
        later
            .iter()
            .find(|candle| zone.is_broken_by(candle.close))
            .map(|candle| candle.time)
    }

    fn push_unique(&self, zones: &mut Vec<Zone>, candidate: Zone) {
        if Self::is_duplicate(&candidate, zones) {
            debug!(
                "[ZoneDetector] Merged {} zone at {} into an existing zone",
                candidate.polarity, candidate.created_at
            );
            return;
        }
        zones.push(candidate);
    }

    /// A candidate duplicates an active zone of the same polarity when their
    /// midpoints are closer than their average height.
    fn is_duplicate(candidate: &Zone, zones: &[Zone]) -> bool {
        zones
            .iter()
            .filter(|z| z.is_active() && z.polarity == candidate.polarity)
            .any(|z| {
                let average_height = (candidate.height() + z.height()) / 2.0;
                (candidate.midpoint() - z.midpoint()).abs() < average_height
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_series(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                // Gentle zig-zag so no candle ties its neighbours.
                let base = 100.0 + (i % 2) as f64 * 0.01 + i as f64 * 0.1;
                Candle::new(i as i64 * 900, base, base + 0.5, base - 0.5, base + 0.2)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history_yields_no_zones() {
        let detector = ZoneDetector::new(12, 3);
        assert!(detector.compute(&flat_series(49)).is_empty());
    }

    #[test]
    fn test_degenerate_pivot_is_widened() {
        let detector = ZoneDetector::new(2, 1);
        let mut candles = flat_series(60);
        // Marubozu low pivot: no lower wick, body bottom equals low.
        candles[30] = Candle::new(30 * 900, 90.0, 95.0, 90.0, 94.0);
        let zones = detector.compute(&candles);
        let zone = zones
            .iter()
            .find(|z| z.created_at == 30 * 900 && z.polarity == Polarity::Demand)
            .expect("demand zone at the pivot");
        assert_eq!(zone.low, 90.0);
        assert!((zone.high - (90.0 + ZONE_WIDEN)).abs() < 1e-12);
        assert!(zone.high > zone.low);
    }

    #[test]
    fn test_break_is_first_close_through_boundary() {
        let detector = ZoneDetector::new(2, 1);
        let mut candles = flat_series(60);
        candles[30] = Candle::new(30 * 900, 100.0, 101.0, 80.0, 99.0);
        candles[40].close = 79.0;
        candles[45].close = 78.0;
        let zones = detector.compute(&candles);
        let zone = zones
            .iter()
            .find(|z| z.created_at == 30 * 900 && z.polarity == Polarity::Demand)
            .expect("demand zone at the pivot");
        assert_eq!(zone.broken_at, Some(40 * 900));
    }

    #[test]
    fn test_overlapping_active_zones_are_merged() {
        let candidate = Zone::new(100.0, 99.0, Polarity::Demand, 10);
        let existing = vec![Zone::new(100.4, 99.4, Polarity::Demand, 5)];
        assert!(ZoneDetector::is_duplicate(&candidate, &existing));

        let far = vec![Zone::new(105.0, 104.0, Polarity::Demand, 5)];
        assert!(!ZoneDetector::is_duplicate(&candidate, &far));

        let other_side = vec![Zone::new(100.4, 99.4, Polarity::Supply, 5)];
        assert!(!ZoneDetector::is_duplicate(&candidate, &other_side));

        let mut broken = Zone::new(100.4, 99.4, Polarity::Demand, 5);
        broken.broken_at = Some(8);
        assert!(!ZoneDetector::is_duplicate(&candidate, &[broken]));
    }
}
