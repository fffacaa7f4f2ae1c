// src/trading/signal_engine.rs
// Per-symbol signal state machine: zone lookup, pattern confirmation, risk
// gates, and the pending -> open -> settled trade lifecycle.

use crate::config::{BotConfig, InstrumentConfig};
use crate::data::{BarUpdate, CandleSeries};
use crate::patterns::{PatternMatch, PatternMatcher};
use crate::trading::events::{EngineOutput, MarketEvent, OutputHandler, ReportKind, ReportingEvent};
use crate::trading::ledger::{Ledger, LedgerRecord, StatsWindow};
use crate::trading::report::{render_settlement, render_summary};
use crate::trading::trades::{IntentId, Trade, TradeIntent};
use crate::types::{Candle, Direction, Polarity, Timeframe};
use crate::zones::{find_zone_mut, Zone, ZoneDetector};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolState {
    /// At least one timeframe has not been backfilled yet.
    WarmingUp,
    Active,
}

/// Why a sealed short-timeframe bar did not produce a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    WarmingUp,
    DailyTradeLimit,
    DailyStopLoss,
    Cooldown,
    NoZone,
    NoPattern,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalCandidate {
    pub direction: Direction,
    pub pattern: &'static str,
    pub entry_price: f64,
    pub signal_time: i64,
    pub zone_polarity: Polarity,
}

fn utc(epoch: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch, 0).unwrap_or_default()
}

fn utc_day(epoch: i64) -> NaiveDate {
    utc(epoch).date_naive()
}

/// Everything one symbol owns. Nothing here is shared across symbols.
#[derive(Debug, Clone)]
pub struct SymbolContext {
    symbol: String,
    instrument: InstrumentConfig,
    long: CandleSeries,
    short: CandleSeries,
    long_ready: bool,
    short_ready: bool,
    zones: Vec<Zone>,
    last_signal_at: Option<i64>,
    day: Option<NaiveDate>,
    daily_trades: u32,
    daily_profit: f64,
}

impl SymbolContext {
    pub fn new(symbol: &str, instrument: InstrumentConfig, config: &BotConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            instrument,
            long: CandleSeries::new(config.long_bars),
            short: CandleSeries::new(config.short_bars),
            long_ready: false,
            short_ready: false,
            zones: Vec::new(),
            last_signal_at: None,
            day: None,
            daily_trades: 0,
            daily_profit: 0.0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn instrument(&self) -> &InstrumentConfig {
        &self.instrument
    }

    pub fn state(&self) -> SymbolState {
        if self.long_ready && self.short_ready {
            SymbolState::Active
        } else {
            SymbolState::WarmingUp
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn series(&self, timeframe: Timeframe) -> &CandleSeries {
        match timeframe {
            Timeframe::Long => &self.long,
            Timeframe::Short => &self.short,
        }
    }

    pub fn daily_trades(&self) -> u32 {
        self.daily_trades
    }

    pub fn daily_profit(&self) -> f64 {
        self.daily_profit
    }

    pub fn last_signal_at(&self) -> Option<i64> {
        self.last_signal_at
    }

    /// Swaps in a freshly computed zone set in one assignment. Zones that
    /// survive the recompute keep their touch count.
    pub fn replace_zones(&mut self, mut zones: Vec<Zone>) {
        for zone in zones.iter_mut() {
            if let Some(previous) = self
                .zones
                .iter()
                .find(|p| p.polarity == zone.polarity && p.created_at == zone.created_at)
            {
                zone.touch_count = previous.touch_count;
            }
        }
        self.zones = zones;
    }

    fn recompute_zones(&mut self, detector: &ZoneDetector) {
        let zones = detector.compute(&self.long.sealed());
        self.replace_zones(zones);
    }

    /// Resets the daily counters when `epoch` falls on a new UTC day.
    /// Returns true when a reset happened.
    fn roll_day(&mut self, epoch: i64) -> bool {
        let day = utc_day(epoch);
        match self.day {
            Some(current) if current == day => false,
            Some(_) => {
                self.day = Some(day);
                self.daily_trades = 0;
                self.daily_profit = 0.0;
                true
            }
            None => {
                self.day = Some(day);
                false
            }
        }
    }

    /// Runs the gates on the sealed short series. On success the matched
    /// zone's touch count and the cooldown stamp are updated.
    pub fn evaluate(
        &mut self,
        config: &BotConfig,
        matcher: &PatternMatcher,
    ) -> Result<SignalCandidate, GateRejection> {
        if self.state() != SymbolState::Active {
            return Err(GateRejection::WarmingUp);
        }
        if self.daily_trades >= config.max_trades_per_day {
            return Err(GateRejection::DailyTradeLimit);
        }
        if self.daily_profit <= config.daily_stop_loss {
            return Err(GateRejection::DailyStopLoss);
        }

        let candles = self.short.sealed();
        let Some(current) = candles.last().copied() else {
            return Err(GateRejection::NoPattern);
        };
        let now = current.time;

        if let Some(last) = self.last_signal_at {
            if now - last < config.cooldown_secs() {
                return Err(GateRejection::Cooldown);
            }
        }

        let Some(zone) = find_zone_mut(&current, &mut self.zones, now, config.max_touches) else {
            return Err(GateRejection::NoZone);
        };
        let Some(PatternMatch { direction, label }) = matcher.scan(&candles, zone.polarity) else {
            return Err(GateRejection::NoPattern);
        };

        zone.touch_count += 1;
        let zone_polarity = zone.polarity;
        debug!(
            "[{}] {} zone {:.5}-{:.5} touched ({}/{})",
            self.symbol, zone.polarity, zone.low, zone.high, zone.touch_count, config.max_touches
        );
        self.last_signal_at = Some(now);

        Ok(SignalCandidate {
            direction,
            pattern: label,
            entry_price: current.close,
            signal_time: now,
            zone_polarity,
        })
    }
}

/// Owns every symbol context, in-flight trades and the ledger. Events must be
/// delivered one at a time; nothing in here blocks.
#[derive(Debug)]
pub struct SignalEngine {
    config: BotConfig,
    detector: ZoneDetector,
    matcher: PatternMatcher,
    symbols: BTreeMap<String, SymbolContext>,
    pending: HashMap<IntentId, Trade>,
    open: HashMap<String, Trade>,
    ledger: Ledger,
    next_intent: u64,
    clock: i64,
    report_day: Option<NaiveDate>,
}

impl SignalEngine {
    pub fn new(config: BotConfig) -> Self {
        let ledger = Ledger::new(config.payout_percent);
        Self::with_ledger(config, ledger)
    }

    /// Starts from a previously persisted ledger.
    pub fn with_ledger(config: BotConfig, ledger: Ledger) -> Self {
        let symbols = config
            .instruments
            .iter()
            .map(|(symbol, instrument)| {
                let ctx = SymbolContext::new(symbol, instrument.clone(), &config);
                (symbol.clone(), ctx)
            })
            .collect();

        info!(
            "🚀 Signal engine ready: {} symbols, max touches {}, cooldown {}min",
            config.instruments.len(),
            config.max_touches,
            config.cooldown_minutes
        );

        Self {
            detector: ZoneDetector::from_config(&config),
            matcher: PatternMatcher::new(config.use_doji),
            symbols,
            pending: HashMap::new(),
            open: HashMap::new(),
            ledger,
            next_intent: 0,
            clock: 0,
            report_day: None,
            config,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn context(&self, symbol: &str) -> Option<&SymbolContext> {
        self.symbols.get(symbol)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pending_trades(&self) -> impl Iterator<Item = (&IntentId, &Trade)> {
        self.pending.iter()
    }

    pub fn open_trade(&self, contract_id: &str) -> Option<&Trade> {
        self.open.get(contract_id)
    }

    pub fn active_trade_count(&self) -> usize {
        self.pending.len() + self.open.len()
    }

    /// Latest event time the engine has observed.
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// Drops a pending trade the broker never acknowledged.
    pub fn discard_pending(&mut self, intent_id: IntentId) -> Option<Trade> {
        let trade = self.pending.remove(&intent_id);
        if trade.is_some() {
            info!("🗑️ Discarded pending trade {}", intent_id);
        }
        trade
    }

    pub fn dispatch(&mut self, event: MarketEvent) -> Vec<EngineOutput> {
        match event {
            MarketEvent::HistoryCandles {
                symbol,
                timeframe,
                candles,
            } => {
                self.on_history_candles(&symbol, timeframe, &candles);
                Vec::new()
            }
            MarketEvent::Bar {
                symbol,
                timeframe,
                candle,
            } => self.on_bar(&symbol, timeframe, candle),
            MarketEvent::OrderOpened {
                intent_id,
                contract_id,
            } => {
                self.on_order_opened(intent_id, &contract_id);
                Vec::new()
            }
            MarketEvent::OrderSettled {
                contract_id,
                exit_price,
                profit,
            } => self.on_order_settled(&contract_id, exit_price, profit),
        }
    }

    pub fn dispatch_to<H: OutputHandler>(&mut self, event: MarketEvent, handler: &mut H) {
        for output in self.dispatch(event) {
            handler.handle(output);
        }
    }

    fn advance_clock(&mut self, epoch: i64) {
        self.clock = self.clock.max(epoch);
    }

    pub fn on_history_candles(&mut self, symbol: &str, timeframe: Timeframe, candles: &[Candle]) {
        let Some(ctx) = self.symbols.get_mut(symbol) else {
            debug!("[SignalEngine] History for unknown symbol {} ignored", symbol);
            return;
        };
        if let Some(last) = candles.iter().map(|c| c.time).max() {
            self.clock = self.clock.max(last);
        }

        match timeframe {
            Timeframe::Long => {
                ctx.long.seed(candles);
                ctx.long_ready = true;
                ctx.recompute_zones(&self.detector);
                let active = ctx.zones.iter().filter(|z| z.is_active()).count();
                info!(
                    "📍 {} | {} zones ({} active) from {} candles",
                    ctx.instrument.name,
                    ctx.zones.len(),
                    active,
                    ctx.long.len()
                );
            }
            Timeframe::Short => {
                ctx.short.seed(candles);
                ctx.short_ready = true;
                info!(
                    "📊 {} | short timeframe ready ({} candles)",
                    ctx.instrument.name,
                    ctx.short.len()
                );
            }
        }
    }

    pub fn on_bar(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        candle: Candle,
    ) -> Vec<EngineOutput> {
        let mut outputs = Vec::new();
        if !self.symbols.contains_key(symbol) {
            debug!("[SignalEngine] Bar for unknown symbol {} ignored", symbol);
            return outputs;
        }
        self.advance_clock(candle.time);

        let Some(ctx) = self.symbols.get_mut(symbol) else {
            return outputs;
        };
        match timeframe {
            Timeframe::Long => {
                if let BarUpdate::Sealed(_) = ctx.long.push(candle) {
                    ctx.recompute_zones(&self.detector);
                }
            }
            Timeframe::Short => {
                if let BarUpdate::Sealed(sealed) = ctx.short.push(candle) {
                    self.on_short_bar_sealed(symbol, sealed, &mut outputs);
                }
            }
        }
        outputs
    }

    fn on_short_bar_sealed(
        &mut self,
        symbol: &str,
        sealed: Candle,
        outputs: &mut Vec<EngineOutput>,
    ) {
        self.check_day_rollover(symbol, sealed.time, outputs);

        let Some(ctx) = self.symbols.get_mut(symbol) else {
            return;
        };
        let candidate = match ctx.evaluate(&self.config, &self.matcher) {
            Ok(candidate) => candidate,
            Err(reason) => {
                if !matches!(reason, GateRejection::NoZone | GateRejection::NoPattern) {
                    debug!("[SignalEngine] {} signal gated: {:?}", symbol, reason);
                }
                return;
            }
        };

        let expiry_minutes = ctx.instrument.expiry_minutes;
        let instrument_name = ctx.instrument.name.clone();
        self.next_intent += 1;
        let intent = TradeIntent {
            intent_id: IntentId(self.next_intent),
            symbol: symbol.to_string(),
            direction: candidate.direction,
            entry_price: candidate.entry_price,
            pattern: candidate.pattern.to_string(),
            stake: self.config.stake,
            expiry_minutes,
            signal_time: candidate.signal_time,
        };

        info!(
            "🎯 {} {} | {} | {}min (off {} zone)",
            intent.direction,
            instrument_name,
            intent.pattern,
            expiry_minutes,
            candidate.zone_polarity
        );
        self.pending.insert(intent.intent_id, Trade::pending(&intent));
        outputs.push(EngineOutput::TradeIntent(intent));
    }

    fn check_day_rollover(&mut self, symbol: &str, epoch: i64, outputs: &mut Vec<EngineOutput>) {
        if let Some(ctx) = self.symbols.get_mut(symbol) {
            if ctx.roll_day(epoch) {
                debug!("[SignalEngine] {} daily counters reset", symbol);
            }
        }

        let day = utc_day(epoch);
        match self.report_day {
            Some(current) if current >= day => {}
            Some(_) => {
                self.report_day = Some(day);
                info!("🔄 New trading day {}", day);
                outputs.push(EngineOutput::Report(ReportingEvent {
                    kind: ReportKind::DayRollover,
                    summary: format!(
                        "🔄 <b>New day</b>\n\n{}",
                        render_summary(&self.ledger, &self.config, utc(epoch))
                    ),
                }));
            }
            None => self.report_day = Some(day),
        }
    }

    pub fn on_order_opened(&mut self, intent_id: IntentId, contract_id: &str) {
        let Some(mut trade) = self.pending.remove(&intent_id) else {
            warn!(
                "[SignalEngine] Order opened for unknown intent {} (contract {})",
                intent_id, contract_id
            );
            return;
        };
        trade.open(contract_id);
        if let Some(ctx) = self.symbols.get_mut(&trade.symbol) {
            ctx.daily_trades += 1;
            info!("📝 Trade opened | {} | ID: {}", ctx.instrument.name, contract_id);
        }
        self.open.insert(contract_id.to_string(), trade);
    }

    pub fn on_order_settled(
        &mut self,
        contract_id: &str,
        exit_price: f64,
        profit: f64,
    ) -> Vec<EngineOutput> {
        let mut outputs = Vec::new();
        let Some(mut trade) = self.open.remove(contract_id) else {
            warn!("[SignalEngine] Settlement for unknown contract {} ignored", contract_id);
            return outputs;
        };
        trade.settle(exit_price, profit, self.clock);

        let instrument_name = match self.symbols.get_mut(&trade.symbol) {
            Some(ctx) => {
                ctx.daily_profit += profit;
                ctx.instrument.name.clone()
            }
            None => trade.symbol.clone(),
        };
        if trade.is_win {
            info!("✅ WIN {:+.2}$ | {} {}", profit, instrument_name, trade.direction);
        } else {
            info!("❌ LOSS {:.2}$ | {} {}", profit, instrument_name, trade.direction);
        }

        let record = LedgerRecord::from(&trade);
        self.ledger.record(trade.clone());
        outputs.push(EngineOutput::LedgerAppend(record));

        let now = utc(self.clock);
        let today = self.ledger.window(StatsWindow::Today, now, None);
        outputs.push(EngineOutput::Report(ReportingEvent {
            kind: ReportKind::TradeSettled,
            summary: render_settlement(&trade, &instrument_name, &today),
        }));
        if today.total > 0 && today.total % 10 == 0 {
            outputs.push(EngineOutput::Report(ReportingEvent {
                kind: ReportKind::MilestoneEvery10Trades,
                summary: render_summary(&self.ledger, &self.config, now),
            }));
        }
        outputs
    }
}
