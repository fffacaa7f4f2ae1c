// src/zones/zone.rs
// Supply/demand zone record and the lookup used by the signal path.

use crate::types::{Candle, Polarity};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Zone {
    pub high: f64,
    pub low: f64,
    pub polarity: Polarity,
    /// Open time of the pivot candle.
    pub created_at: i64,
    /// Time of the first later close through the invalidation boundary.
    pub broken_at: Option<i64>,
    /// Signals this zone has gated so far.
    pub touch_count: u32,
}

impl Zone {
    pub fn new(high: f64, low: f64, polarity: Polarity, created_at: i64) -> Self {
        Self {
            high,
            low,
            polarity,
            created_at,
            broken_at: None,
            touch_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.broken_at.is_none()
    }

    pub fn height(&self) -> f64 {
        self.high - self.low
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Whether a close at `close` invalidates the zone.
    pub fn is_broken_by(&self, close: f64) -> bool {
        match self.polarity {
            Polarity::Supply => close > self.high,
            Polarity::Demand => close < self.low,
        }
    }

    /// Whether the zone may gate a signal on a candle stamped `now`.
    pub fn is_usable_at(&self, now: i64, max_touches: u32) -> bool {
        if self.created_at >= now {
            return false;
        }
        if matches!(self.broken_at, Some(broken) if broken <= now) {
            return false;
        }
        self.touch_count < max_touches
    }

    /// A wick into the zone with a close that stayed on the zone's side.
    pub fn is_retested_by(&self, candle: &Candle) -> bool {
        match self.polarity {
            Polarity::Demand => candle.low <= self.high && candle.close >= self.low,
            Polarity::Supply => candle.high >= self.low && candle.close <= self.high,
        }
    }
}

fn matches_candle(zone: &Zone, candle: &Candle, now: i64, max_touches: u32) -> bool {
    zone.is_usable_at(now, max_touches) && zone.is_retested_by(candle)
}

/// Most recently created zone retested by `candle`, if any.
pub fn find_zone<'a>(
    candle: &Candle,
    zones: &'a [Zone],
    now: i64,
    max_touches: u32,
) -> Option<&'a Zone> {
    zones
        .iter()
        .rev()
        .find(|zone| matches_candle(zone, candle, now, max_touches))
}

pub fn find_zone_mut<'a>(
    candle: &Candle,
    zones: &'a mut [Zone],
    now: i64,
    max_touches: u32,
) -> Option<&'a mut Zone> {
    zones
        .iter_mut()
        .rev()
        .find(|zone| matches_candle(zone, candle, now, max_touches))
}
