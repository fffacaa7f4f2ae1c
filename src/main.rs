// src/main.rs
// CLI entry point: ledger reports and offline candle replays through the engine.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use liquidity_zone_bot::data::{granularity_secs, load_candles_csv};
use liquidity_zone_bot::notifications::TelegramNotifier;
use liquidity_zone_bot::persistence::{JsonLedgerStore, LedgerStore};
use liquidity_zone_bot::trading::ledger::Ledger;
use liquidity_zone_bot::trading::report::render_summary;
use liquidity_zone_bot::{
    BotConfig, BotError, Candle, EngineOutput, MarketEvent, SignalEngine, Timeframe,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "liquidity_zone_bot", about = "Liquidity zone signal engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the win/loss report from the ledger file.
    Stats {
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Feed CSV candles through the engine and log every signal (dry run).
    Replay {
        #[arg(long)]
        symbol: String,
        /// Long-timeframe candles (time,open,high,low,close).
        #[arg(long)]
        long: PathBuf,
        /// Short-timeframe candles (time,open,high,low,close).
        #[arg(long)]
        short: PathBuf,
        /// Long candles delivered as history before streaming.
        #[arg(long, default_value_t = 200)]
        warmup_long: usize,
        /// Short candles delivered as history before streaming.
        #[arg(long, default_value_t = 50)]
        warmup_short: usize,
        /// Forward signals and reports to Telegram.
        #[arg(long)]
        notify: bool,
    },
}

fn load_ledger(config: &BotConfig, store: &JsonLedgerStore) -> Ledger {
    match store.load() {
        Ok(records) => Ledger::from_records(&records, config.payout_percent, config.stake),
        Err(e) => {
            warn!("📂 Could not read ledger {:?}: {}", store.path(), e);
            Ledger::new(config.payout_percent)
        }
    }
}

/// Rejects a candle file whose bar spacing is not the configured granularity
/// of `expected`. Files too short to measure pass.
fn check_feed(
    config: &BotConfig,
    path: &Path,
    candles: &[Candle],
    expected: Timeframe,
) -> Result<(), BotError> {
    let Some(secs) = granularity_secs(candles) else {
        return Ok(());
    };
    match config.timeframe_for(secs) {
        Some(timeframe) if timeframe == expected => Ok(()),
        found => Err(BotError::Config(format!(
            "{:?} has {}s bars ({:?}), expected the {} timeframe",
            path, secs, found, expected
        ))),
    }
}

/// Interleaves the two streams by time; long bars go first on ties so zones
/// are current before the short bar is evaluated.
fn merge_bars(symbol: &str, long: &[Candle], short: &[Candle]) -> Vec<MarketEvent> {
    let mut events: Vec<(i64, u8, MarketEvent)> = long
        .iter()
        .map(|c| (c.time, 0, Timeframe::Long, *c))
        .chain(short.iter().map(|c| (c.time, 1, Timeframe::Short, *c)))
        .map(|(time, order, timeframe, candle)| {
            (
                time,
                order,
                MarketEvent::Bar {
                    symbol: symbol.to_string(),
                    timeframe,
                    candle,
                },
            )
        })
        .collect();
    events.sort_by_key(|(time, order, _)| (*time, *order));
    events.into_iter().map(|(_, _, event)| event).collect()
}

async fn replay(
    config: BotConfig,
    symbol: String,
    long_path: PathBuf,
    short_path: PathBuf,
    warmup_long: usize,
    warmup_short: usize,
    notify: bool,
) -> Result<(), BotError> {
    let instrument_name = config
        .instrument(&symbol)
        .map(|i| i.name.clone())
        .ok_or_else(|| BotError::UnknownSymbol(symbol.clone()))?;

    let long = load_candles_csv(&long_path)?;
    let short = load_candles_csv(&short_path)?;
    check_feed(&config, &long_path, &long, Timeframe::Long)?;
    check_feed(&config, &short_path, &short, Timeframe::Short)?;
    let (long_history, long_stream) = long.split_at(warmup_long.min(long.len()));
    let (short_history, short_stream) = short.split_at(warmup_short.min(short.len()));

    if notify && !config.telegram_enabled() {
        warn!("📱 --notify given but Telegram credentials are missing; nothing will be sent");
    }
    let notifier = if notify {
        Some(TelegramNotifier::from_config(&config))
    } else {
        None
    };
    let mut engine = SignalEngine::new(config);

    engine.dispatch(MarketEvent::HistoryCandles {
        symbol: symbol.clone(),
        timeframe: Timeframe::Long,
        candles: long_history.to_vec(),
    });
    engine.dispatch(MarketEvent::HistoryCandles {
        symbol: symbol.clone(),
        timeframe: Timeframe::Short,
        candles: short_history.to_vec(),
    });

    let mut signals = 0usize;
    for event in merge_bars(&symbol, long_stream, short_stream) {
        let outputs = engine.dispatch(event);
        for output in outputs {
            match output {
                EngineOutput::TradeIntent(intent) => {
                    signals += 1;
                    info!(
                        "🎯 {} {} {} @ {} | {} | {}min",
                        intent.intent_id,
                        intent.direction,
                        intent.symbol,
                        intent.entry_price,
                        intent.pattern,
                        intent.expiry_minutes
                    );
                    if let Some(notifier) = &notifier {
                        if let Err(e) = notifier
                            .send_signal(&intent, &instrument_name, engine.active_trade_count())
                            .await
                        {
                            error!("📱 Telegram error: {}", e);
                        }
                    }
                    // Dry run: nothing reaches a broker, so the intent is dropped.
                    engine.discard_pending(intent.intent_id);
                }
                EngineOutput::Report(report) => {
                    info!("📣 {:?}", report.kind);
                    if let Some(notifier) = &notifier {
                        if let Err(e) = notifier.send_report(&report).await {
                            error!("📱 Telegram error: {}", e);
                        }
                    }
                }
                EngineOutput::LedgerAppend(_) => {}
            }
        }
    }

    if let Some(ctx) = engine.context(&symbol) {
        let active = ctx.zones().iter().filter(|z| z.is_active()).count();
        info!(
            "🏁 Replay finished: {} signals, {} zones ({} active)",
            signals,
            ctx.zones().len(),
            active
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BotError> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = BotConfig::from_env();
    config.validate()?;

    match cli.command {
        Command::Stats { ledger } => {
            let path = ledger.unwrap_or_else(|| PathBuf::from(&config.ledger_path));
            let store = JsonLedgerStore::new(path);
            let ledger = load_ledger(&config, &store);
            println!("{}", render_summary(&ledger, &config, chrono::Utc::now()));
        }
        Command::Replay {
            symbol,
            long,
            short,
            warmup_long,
            warmup_short,
            notify,
        } => {
            replay(config, symbol, long, short, warmup_long, warmup_short, notify).await?;
        }
    }
    Ok(())
}
