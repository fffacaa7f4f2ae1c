// src/trading/events.rs
// Inbound events the engine consumes and the outputs it hands to collaborators.

use crate::trading::ledger::LedgerRecord;
use crate::trading::trades::{IntentId, TradeIntent};
use crate::types::{Candle, Timeframe};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// Bulk backfill; marks the symbol/timeframe as ready.
    HistoryCandles {
        symbol: String,
        timeframe: Timeframe,
        candles: Vec<Candle>,
    },
    /// Forming or new bar.
    Bar {
        symbol: String,
        timeframe: Timeframe,
        candle: Candle,
    },
    OrderOpened {
        intent_id: IntentId,
        contract_id: String,
    },
    OrderSettled {
        contract_id: String,
        exit_price: f64,
        profit: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DayRollover,
    MilestoneEvery10Trades,
    TradeSettled,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportingEvent {
    pub kind: ReportKind,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    TradeIntent(TradeIntent),
    Report(ReportingEvent),
    LedgerAppend(LedgerRecord),
}

/// Receives engine outputs. Implementations must not block the caller for
/// long; slow work (network, disk) belongs behind a queue.
pub trait OutputHandler {
    fn handle(&mut self, output: EngineOutput);
}

impl OutputHandler for Vec<EngineOutput> {
    fn handle(&mut self, output: EngineOutput) {
        self.push(output);
    }
}
