// src/trading/mod.rs
pub mod events;
pub mod ledger;
pub mod report;
pub mod signal_engine;
pub mod trades;

pub use events::{EngineOutput, MarketEvent, OutputHandler, ReportKind, ReportingEvent};
pub use ledger::{Ledger, LedgerRecord, StatsSummary, StatsWindow};
pub use signal_engine::{GateRejection, SignalCandidate, SignalEngine, SymbolContext, SymbolState};
pub use trades::{IntentId, Trade, TradeIntent, TradeStatus};
