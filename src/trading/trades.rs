// src/trading/trades.rs
use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identifier of an emitted intent, echoed back by the
/// execution collaborator when the broker accepts the order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentId(pub u64);

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    /// Intent emitted, no broker id yet.
    Pending,
    /// Broker contract assigned, waiting for settlement.
    Open,
    Settled,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trade {
    pub signal_time: i64,
    pub result_time: Option<i64>,
    pub direction: Direction,
    pub symbol: String,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub stake: f64,
    pub expiry_minutes: u32,
    pub pattern: String,
    pub contract_id: Option<String>,
    pub status: TradeStatus,
    pub is_win: bool,
    pub profit: f64,
}

impl Trade {
    pub fn pending(intent: &TradeIntent) -> Self {
        Self {
            signal_time: intent.signal_time,
            result_time: None,
            direction: intent.direction,
            symbol: intent.symbol.clone(),
            entry_price: intent.entry_price,
            exit_price: None,
            stake: intent.stake,
            expiry_minutes: intent.expiry_minutes,
            pattern: intent.pattern.clone(),
            contract_id: None,
            status: TradeStatus::Pending,
            is_win: false,
            profit: 0.0,
        }
    }

    pub fn open(&mut self, contract_id: &str) {
        if self.status != TradeStatus::Pending {
            return;
        }
        self.contract_id = Some(contract_id.to_string());
        self.status = TradeStatus::Open;
    }

    /// Resolves the trade. A trade is a win iff its profit is positive.
    pub fn settle(&mut self, exit_price: f64, profit: f64, result_time: i64) {
        if self.status == TradeStatus::Settled {
            return;
        }
        self.exit_price = Some(exit_price);
        self.profit = profit;
        self.is_win = profit > 0.0;
        self.result_time = Some(result_time);
        self.status = TradeStatus::Settled;
    }
}

/// A signal handed to the execution collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub intent_id: IntentId,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub pattern: String,
    pub stake: f64,
    pub expiry_minutes: u32,
    pub signal_time: i64,
}

impl TradeIntent {
    /// Notification text for the signal.
    pub fn describe(&self, instrument_name: &str, active_trades: usize) -> String {
        let emoji = match self.direction {
            Direction::Up => "🟢",
            Direction::Down => "🔴",
        };
        format!(
            "{} <b>SIGNAL {}</b>\n\
             📌 {}\n\
             📐 {}\n\
             💵 Price: {}\n\
             💰 Stake: {}$\n\
             ⏱ Expiry: {} min\n\
             📊 Active trades: {}",
            emoji,
            self.direction,
            instrument_name,
            self.pattern,
            self.entry_price,
            self.stake,
            self.expiry_minutes,
            active_trades
        )
    }
}
