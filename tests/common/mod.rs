// tests/common/mod.rs
// Shared candle fixtures for the integration tests.
#![allow(dead_code)]

use liquidity_zone_bot::{BotConfig, Candle, EngineOutput, SignalEngine, Timeframe};

pub const SYMBOL: &str = "R_10";
pub const LONG_SECS: i64 = 900;
pub const SHORT_SECS: i64 = 60;
/// First short-timeframe bar, after every long candle of the V fixture.
pub const SHORT_START: i64 = 60_000;

pub fn setup_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 61 long candles tracing a V whose single low pivot sits at index 30.
/// Yields exactly one Demand zone, 99.5..100.0, created at `30 * LONG_SECS`.
pub fn v_series() -> Vec<Candle> {
    (0..=60)
        .map(|i: i64| {
            let p = 100.0 + (i - 30).abs() as f64;
            Candle::new(i * LONG_SECS, p, p + 0.5, p - 0.5, p + 0.3)
        })
        .collect()
}

/// Mirror of [`v_series`]: a single high pivot at index 30 yielding one
/// Supply zone, 100.3..100.5, created at `30 * LONG_SECS`.
pub fn inverted_v_series() -> Vec<Candle> {
    (0..=60)
        .map(|i: i64| {
            let p = 100.0 - (i - 30).abs() as f64;
            Candle::new(i * LONG_SECS, p, p + 0.5, p - 0.5, p + 0.3)
        })
        .collect()
}

/// Sits far above the V zone.
pub fn neutral(time: i64) -> Candle {
    Candle::new(time, 105.0, 105.5, 104.5, 105.2)
}

/// Bearish bar wicking into the Demand zone without forming a pattern.
pub fn dip(time: i64) -> Candle {
    Candle::new(time, 101.0, 101.1, 99.8, 100.2)
}

/// Bullish bar engulfing a preceding [`dip`] while retesting the zone.
pub fn engulfing(time: i64) -> Candle {
    Candle::new(time, 100.1, 101.3, 99.9, 101.2)
}

/// Sits far below the inverted-V zone.
pub fn neutral_below(time: i64) -> Candle {
    Candle::new(time, 95.0, 95.5, 94.5, 94.8)
}

/// Bullish bar wicking into the Supply zone without forming a pattern.
pub fn rally(time: i64) -> Candle {
    Candle::new(time, 99.0, 100.4, 98.9, 99.8)
}

/// Bearish bar engulfing a preceding [`rally`] while retesting the zone.
pub fn bearish_engulfing(time: i64) -> Candle {
    Candle::new(time, 99.9, 100.4, 98.7, 98.8)
}

pub fn single_symbol_config() -> BotConfig {
    let mut config = BotConfig::default();
    config.instruments.retain(|symbol, _| symbol == SYMBOL);
    config
}

/// Engine with the V zone in place and five neutral short bars of history.
pub fn primed_engine(config: BotConfig) -> SignalEngine {
    primed_engine_with(config, &v_series(), neutral)
}

/// Engine with the inverted-V zone and five short bars below it.
pub fn primed_supply_engine(config: BotConfig) -> SignalEngine {
    primed_engine_with(config, &inverted_v_series(), neutral_below)
}

fn primed_engine_with(
    config: BotConfig,
    long: &[Candle],
    filler: fn(i64) -> Candle,
) -> SignalEngine {
    setup_test_logging();
    let mut engine = SignalEngine::new(config);
    engine.on_history_candles(SYMBOL, Timeframe::Long, long);
    let short: Vec<Candle> = (0..5).map(|k| filler(SHORT_START + k * SHORT_SECS)).collect();
    engine.on_history_candles(SYMBOL, Timeframe::Short, &short);
    engine
}

/// Streams dip, engulfing, then a neutral bar that seals the engulfing one.
/// Consumes three short slots starting at `start`.
pub fn feed_pair(engine: &mut SignalEngine, start: i64) -> Vec<EngineOutput> {
    feed_bars(engine, start, [dip, engulfing, neutral])
}

/// Supply-side mirror of [`feed_pair`].
pub fn feed_bearish_pair(engine: &mut SignalEngine, start: i64) -> Vec<EngineOutput> {
    feed_bars(engine, start, [rally, bearish_engulfing, neutral_below])
}

fn feed_bars(
    engine: &mut SignalEngine,
    start: i64,
    bars: [fn(i64) -> Candle; 3],
) -> Vec<EngineOutput> {
    let mut outputs = Vec::new();
    for (k, bar) in (0..).zip(bars) {
        let candle = bar(start + k * SHORT_SECS);
        outputs.extend(engine.on_bar(SYMBOL, Timeframe::Short, candle));
    }
    outputs
}

pub fn intents(outputs: &[EngineOutput]) -> Vec<liquidity_zone_bot::trading::TradeIntent> {
    outputs
        .iter()
        .filter_map(|o| match o {
            EngineOutput::TradeIntent(intent) => Some(intent.clone()),
            _ => None,
        })
        .collect()
}
