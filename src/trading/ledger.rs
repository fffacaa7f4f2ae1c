// src/trading/ledger.rs
// Append-only record of settled trades and the windowed statistics derived from it.

use crate::trading::trades::{Trade, TradeStatus};
use crate::types::Direction;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persisted form of a settled trade.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub time: i64,
    #[serde(rename = "dir")]
    pub direction: Direction,
    pub symbol: String,
    pub win: bool,
    pub profit: f64,
    #[serde(default = "default_expiry")]
    pub expiry: u32,
}

fn default_expiry() -> u32 {
    5
}

impl From<&Trade> for LedgerRecord {
    fn from(trade: &Trade) -> Self {
        Self {
            time: trade.signal_time,
            direction: trade.direction,
            symbol: trade.symbol.clone(),
            win: trade.is_win,
            profit: trade.profit,
            expiry: trade.expiry_minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsWindow {
    Today,
    Week,
    Month,
    AllTime,
}

impl StatsWindow {
    /// Epoch second the window opens at (UTC), `None` for all-time.
    pub fn start(&self, now: DateTime<Utc>) -> Option<i64> {
        let today = now.date_naive();
        let first_day: NaiveDate = match self {
            StatsWindow::Today => today,
            StatsWindow::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            StatsWindow::Month => today.with_day(1)?,
            StatsWindow::AllTime => return None,
        };
        first_day.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc().timestamp())
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
    /// Percentage, 0 when there are no trades.
    pub win_rate: f64,
    /// Payout-model profit: `wins * payout% - losses`, in stakes.
    pub profit: f64,
    /// Positive for a running win streak, negative for a loss streak.
    pub streak: i32,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
}

impl StatsSummary {
    pub fn streak_label(&self) -> String {
        match self.streak {
            s if s > 0 => format!("{}W", s),
            s if s < 0 => format!("{}L", s.unsigned_abs()),
            _ => "0".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    trades: Vec<Trade>,
    payout_percent: f64,
}

impl Ledger {
    pub fn new(payout_percent: f64) -> Self {
        Self {
            trades: Vec::new(),
            payout_percent,
        }
    }

    /// Rebuilds settled trades from persisted records. Entry price and
    /// pattern are not persisted and come back as 0 / empty.
    pub fn from_records(records: &[LedgerRecord], payout_percent: f64, stake: f64) -> Self {
        let trades = records
            .iter()
            .map(|r| Trade {
                signal_time: r.time,
                result_time: None,
                direction: r.direction,
                symbol: r.symbol.clone(),
                entry_price: 0.0,
                exit_price: None,
                stake,
                expiry_minutes: r.expiry,
                pattern: String::new(),
                contract_id: None,
                status: TradeStatus::Settled,
                is_win: r.win,
                profit: r.profit,
            })
            .collect();
        Self {
            trades,
            payout_percent,
        }
    }

    pub fn record(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn records(&self) -> Vec<LedgerRecord> {
        self.trades.iter().map(LedgerRecord::from).collect()
    }

    /// Aggregates trades signalled at or after `from_time`, optionally for one symbol.
    pub fn calc(&self, from_time: Option<i64>, symbol: Option<&str>) -> StatsSummary {
        let mut summary = StatsSummary::default();
        let mut win_run = 0u32;
        let mut loss_run = 0u32;

        let selected = self
            .trades
            .iter()
            .filter(|t| from_time.map_or(true, |from| t.signal_time >= from))
            .filter(|t| symbol.map_or(true, |s| t.symbol == s));

        for trade in selected {
            if trade.is_win {
                summary.wins += 1;
                win_run += 1;
                loss_run = 0;
                summary.max_win_streak = summary.max_win_streak.max(win_run);
            } else {
                summary.losses += 1;
                loss_run += 1;
                win_run = 0;
                summary.max_loss_streak = summary.max_loss_streak.max(loss_run);
            }
        }

        summary.total = summary.wins + summary.losses;
        summary.streak = if win_run > 0 {
            win_run as i32
        } else {
            -(loss_run as i32)
        };
        if summary.total > 0 {
            summary.win_rate = f64::from(summary.wins) / f64::from(summary.total) * 100.0;
        }
        summary.profit =
            f64::from(summary.wins) * self.payout_percent / 100.0 - f64::from(summary.losses);
        summary
    }

    pub fn window(
        &self,
        window: StatsWindow,
        now: DateTime<Utc>,
        symbol: Option<&str>,
    ) -> StatsSummary {
        self.calc(window.start(now), symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settled(symbol: &str, time: i64, win: bool) -> Trade {
        Trade {
            signal_time: time,
            result_time: Some(time + 60),
            direction: Direction::Up,
            symbol: symbol.to_string(),
            entry_price: 1.0,
            exit_price: Some(1.0),
            stake: 1.0,
            expiry_minutes: 15,
            pattern: "Hammer".to_string(),
            contract_id: Some("c".to_string()),
            status: TradeStatus::Settled,
            is_win: win,
            profit: if win { 0.95 } else { -1.0 },
        }
    }

    #[test]
    fn test_streaks_and_payout_profit() {
        let mut ledger = Ledger::new(95.0);
        for (i, win) in [true, true, false, false, false, true].iter().enumerate() {
            ledger.record(settled("R_10", i as i64, *win));
        }
        let s = ledger.calc(None, None);
        assert_eq!((s.wins, s.losses, s.total), (3, 3, 6));
        assert_eq!(s.win_rate, 50.0);
        assert!((s.profit - (3.0 * 0.95 - 3.0)).abs() < 1e-9);
        assert_eq!(s.streak, 1);
        assert_eq!(s.max_win_streak, 2);
        assert_eq!(s.max_loss_streak, 3);
        assert_eq!(s.streak_label(), "1W");
    }

    #[test]
    fn test_loss_streak_is_negative() {
        let mut ledger = Ledger::new(95.0);
        ledger.record(settled("R_10", 1, true));
        ledger.record(settled("R_10", 2, false));
        ledger.record(settled("R_10", 3, false));
        let s = ledger.calc(None, None);
        assert_eq!(s.streak, -2);
        assert_eq!(s.streak_label(), "2L");
    }

    #[test]
    fn test_empty_ledger() {
        let s = Ledger::new(95.0).calc(None, None);
        assert_eq!(s, StatsSummary::default());
        assert_eq!(s.streak_label(), "0");
    }

    #[test]
    fn test_window_and_symbol_filters() {
        // Wednesday 2024-05-15 12:00 UTC.
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap().timestamp();
        let monday = Utc.with_ymd_and_hms(2024, 5, 13, 9, 0, 0).unwrap().timestamp();
        let early_month = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap().timestamp();
        let last_month = Utc.with_ymd_and_hms(2024, 4, 30, 9, 0, 0).unwrap().timestamp();

        let mut ledger = Ledger::new(95.0);
        ledger.record(settled("R_10", last_month, true));
        ledger.record(settled("R_25", early_month, false));
        ledger.record(settled("R_10", monday, true));
        ledger.record(settled("R_25", today, true));

        assert_eq!(ledger.window(StatsWindow::Today, now, None).total, 1);
        assert_eq!(ledger.window(StatsWindow::Week, now, None).total, 2);
        assert_eq!(ledger.window(StatsWindow::Month, now, None).total, 3);
        assert_eq!(ledger.window(StatsWindow::AllTime, now, None).total, 4);
        assert_eq!(ledger.window(StatsWindow::Month, now, Some("R_25")).total, 2);
    }

    #[test]
    fn test_records_round_trip_through_ledger() {
        let mut ledger = Ledger::new(95.0);
        ledger.record(settled("R_75", 100, false));
        let records = ledger.records();
        let rebuilt = Ledger::from_records(&records, 95.0, 1.0);
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt.trades()[0].entry_price, 0.0);
        assert_eq!(rebuilt.calc(None, Some("R_75")).losses, 1);
    }

    #[test]
    fn test_record_defaults_missing_expiry() {
        let json = r#"{"time": 10, "dir": "PUT", "symbol": "R_10", "win": true, "profit": 0.95}"#;
        let record: LedgerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.expiry, 5);
        assert_eq!(record.direction, Direction::Down);
    }
}
