// src/data/candle_series.rs
// Bounded per-symbol, per-timeframe candle buffer with a separate forming slot.

use crate::types::Candle;
use log::debug;
use std::collections::VecDeque;

/// Outcome of pushing a bar into a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarUpdate {
    /// First bar in an empty series; nothing sealed yet.
    Started,
    /// Same timestamp as the forming bar, which was replaced in place.
    Updated,
    /// A newer timestamp arrived: the previous forming bar is now final.
    Sealed(Candle),
    /// Older than the forming bar; ignored.
    Stale,
}

#[derive(Debug, Clone)]
pub struct CandleSeries {
    sealed: VecDeque<Candle>,
    forming: Option<Candle>,
    capacity: usize,
}

impl CandleSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            sealed: VecDeque::with_capacity(capacity.min(4096)),
            forming: None,
            capacity: capacity.max(1),
        }
    }

    /// Replaces the whole buffer with a history snapshot. The newest candle
    /// becomes the forming bar; duplicate timestamps keep the last copy.
    pub fn seed(&mut self, candles: &[Candle]) {
        let mut ordered: Vec<Candle> = candles.to_vec();
        ordered.sort_by_key(|c| c.time);

        let mut deduped: Vec<Candle> = Vec::with_capacity(ordered.len());
        for candle in ordered {
            match deduped.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => deduped.push(candle),
            }
        }

        self.sealed.clear();
        self.forming = deduped.pop();
        let keep = self.capacity.saturating_sub(1);
        let skip = deduped.len().saturating_sub(keep);
        self.sealed.extend(deduped.into_iter().skip(skip));
    }

    pub fn push(&mut self, candle: Candle) -> BarUpdate {
        match self.forming {
            None => {
                if let Some(last) = self.sealed.back() {
                    if candle.time <= last.time {
                        debug!(
                            "[CandleSeries] Ignoring bar at {} (last sealed {})",
                            candle.time, last.time
                        );
                        return BarUpdate::Stale;
                    }
                }
                self.forming = Some(candle);
                BarUpdate::Started
            }
            Some(current) if candle.time == current.time => {
                self.forming = Some(candle);
                BarUpdate::Updated
            }
            Some(current) if candle.time > current.time => {
                self.sealed.push_back(current);
                self.forming = Some(candle);
                self.evict();
                BarUpdate::Sealed(current)
            }
            Some(current) => {
                debug!(
                    "[CandleSeries] Ignoring stale bar at {} (forming {})",
                    candle.time, current.time
                );
                BarUpdate::Stale
            }
        }
    }

    fn evict(&mut self) {
        while self.len() > self.capacity {
            if self.sealed.pop_front().is_none() {
                break;
            }
        }
    }

    /// Finalised candles, oldest first.
    pub fn sealed(&self) -> Vec<Candle> {
        self.sealed.iter().copied().collect()
    }

    pub fn sealed_len(&self) -> usize {
        self.sealed.len()
    }

    pub fn forming(&self) -> Option<&Candle> {
        self.forming.as_ref()
    }

    /// Total buffered candles, forming bar included.
    pub fn len(&self) -> usize {
        self.sealed.len() + usize::from(self.forming.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close + 1.0, close - 1.0, close)
    }

    #[test]
    fn test_same_timestamp_replaces_forming_bar() {
        let mut series = CandleSeries::new(10);
        assert_eq!(series.push(bar(60, 1.0)), BarUpdate::Started);
        assert_eq!(series.push(bar(60, 2.0)), BarUpdate::Updated);
        assert_eq!(series.push(bar(60, 3.0)), BarUpdate::Updated);
        assert_eq!(series.len(), 1);
        assert_eq!(series.forming().map(|c| c.close), Some(3.0));
        assert_eq!(series.sealed_len(), 0);
    }

    #[test]
    fn test_new_timestamp_seals_previous_bar() {
        let mut series = CandleSeries::new(10);
        series.push(bar(60, 1.0));
        series.push(bar(60, 1.5));
        assert_eq!(series.push(bar(120, 2.0)), BarUpdate::Sealed(bar(60, 1.5)));
        assert_eq!(series.sealed(), vec![bar(60, 1.5)]);
        assert_eq!(series.forming().map(|c| c.time), Some(120));
    }

    #[test]
    fn test_stale_bar_is_ignored() {
        let mut series = CandleSeries::new(10);
        series.push(bar(120, 1.0));
        assert_eq!(series.push(bar(60, 9.0)), BarUpdate::Stale);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_sealed() {
        let mut series = CandleSeries::new(3);
        for t in 1..=5 {
            series.push(bar(t * 60, t as f64));
        }
        assert_eq!(series.len(), 3);
        let times: Vec<i64> = series.sealed().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![180, 240]);
    }

    #[test]
    fn test_seed_is_idempotent_and_dedupes() {
        let history = vec![bar(180, 3.0), bar(60, 1.0), bar(120, 2.0), bar(120, 2.5)];
        let mut series = CandleSeries::new(10);
        series.seed(&history);
        let first = (series.sealed(), series.forming().copied());
        series.seed(&history);
        assert_eq!((series.sealed(), series.forming().copied()), first);
        assert_eq!(series.len(), 3);
        assert_eq!(series.sealed()[1].close, 2.5);
        assert_eq!(series.forming().map(|c| c.time), Some(180));
    }

    #[test]
    fn test_seed_respects_capacity() {
        let history: Vec<Candle> = (1..=10).map(|t| bar(t * 60, t as f64)).collect();
        let mut series = CandleSeries::new(4);
        series.seed(&history);
        assert_eq!(series.len(), 4);
        assert_eq!(series.sealed().first().map(|c| c.time), Some(420));
    }
}
