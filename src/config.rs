// src/config.rs
// Bot settings with defaults and environment overrides.

use crate::errors::{BotError, Result};
use crate::types::Timeframe;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstrumentConfig {
    pub name: String,
    pub expiry_minutes: u32,
}

impl InstrumentConfig {
    pub fn new(name: &str, expiry_minutes: u32) -> Self {
        Self {
            name: name.to_string(),
            expiry_minutes,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BotConfig {
    pub instruments: BTreeMap<String, InstrumentConfig>,
    pub stake: f64,
    pub cooldown_minutes: u32,
    /// Payout percentage used by the reporting profit model.
    pub payout_percent: f64,
    pub use_doji: bool,
    pub pivot_depth: usize,
    pub pivot_backstep: usize,
    pub max_touches: u32,
    pub long_bars: usize,
    pub short_bars: usize,
    pub max_trades_per_day: u32,
    /// Daily profit at or below which signals stop for the day.
    pub daily_stop_loss: f64,
    pub long_granularity_secs: u32,
    pub short_granularity_secs: u32,
    pub ledger_path: String,
    #[serde(skip_serializing)]
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        let mut instruments = BTreeMap::new();
        instruments.insert("R_10".to_string(), InstrumentConfig::new("Volatility 10", 30));
        instruments.insert("R_25".to_string(), InstrumentConfig::new("Volatility 25", 15));
        instruments.insert("R_75".to_string(), InstrumentConfig::new("Volatility 75", 15));

        Self {
            instruments,
            stake: 1.0,
            cooldown_minutes: 5,
            payout_percent: 95.0,
            use_doji: true,
            pivot_depth: 12,
            pivot_backstep: 3,
            max_touches: 10,
            long_bars: 2880,
            short_bars: 500,
            max_trades_per_day: 60,
            daily_stop_loss: -15.0,
            long_granularity_secs: 900,
            short_granularity_secs: 60,
            ledger_path: "bot_stats.json".to_string(),
            telegram_token: None,
            telegram_chat_id: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("⚙️ Ignoring unparsable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses `SYMBOL:EXPIRY:Display Name` entries separated by commas.
pub fn parse_instruments(raw: &str) -> Result<BTreeMap<String, InstrumentConfig>> {
    let mut instruments = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.splitn(3, ':');
        let symbol = parts.next().unwrap_or_default().trim();
        let expiry = parts
            .next()
            .and_then(|e| e.trim().parse::<u32>().ok())
            .ok_or_else(|| BotError::Config(format!("bad instrument entry '{}'", entry)))?;
        let name = parts.next().map(str::trim).unwrap_or(symbol);
        if symbol.is_empty() {
            return Err(BotError::Config(format!("bad instrument entry '{}'", entry)));
        }
        instruments.insert(symbol.to_string(), InstrumentConfig::new(name, expiry));
    }
    Ok(instruments)
}

impl BotConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let instruments = match env::var("BOT_INSTRUMENTS") {
            Ok(raw) => match parse_instruments(&raw) {
                Ok(parsed) if !parsed.is_empty() => parsed,
                Ok(_) => defaults.instruments.clone(),
                Err(e) => {
                    warn!("⚙️ {}; falling back to default instruments", e);
                    defaults.instruments.clone()
                }
            },
            Err(_) => defaults.instruments.clone(),
        };

        let config = Self {
            instruments,
            stake: env_or("BOT_STAKE", defaults.stake),
            cooldown_minutes: env_or("BOT_COOLDOWN_MINUTES", defaults.cooldown_minutes),
            payout_percent: env_or("BOT_PAYOUT_PERCENT", defaults.payout_percent),
            use_doji: env_or("BOT_USE_DOJI", defaults.use_doji),
            pivot_depth: env_or("BOT_PIVOT_DEPTH", defaults.pivot_depth),
            pivot_backstep: env_or("BOT_PIVOT_BACKSTEP", defaults.pivot_backstep),
            max_touches: env_or("BOT_MAX_TOUCHES", defaults.max_touches),
            long_bars: env_or("BOT_LONG_BARS", defaults.long_bars),
            short_bars: env_or("BOT_SHORT_BARS", defaults.short_bars),
            max_trades_per_day: env_or("BOT_MAX_TRADES_PER_DAY", defaults.max_trades_per_day),
            daily_stop_loss: env_or("BOT_DAILY_STOP_LOSS", defaults.daily_stop_loss),
            long_granularity_secs: env_or("BOT_LONG_GRANULARITY", defaults.long_granularity_secs),
            short_granularity_secs: env_or(
                "BOT_SHORT_GRANULARITY",
                defaults.short_granularity_secs,
            ),
            ledger_path: env::var("BOT_LEDGER_PATH").unwrap_or(defaults.ledger_path),
            telegram_token: non_empty_env("TELEGRAM_TOKEN"),
            telegram_chat_id: non_empty_env("TELEGRAM_CHAT_ID"),
        };

        info!(
            "⚙️ Config loaded: {} instruments, stake {}, cooldown {}min, max touches {}",
            config.instruments.len(),
            config.stake,
            config.cooldown_minutes,
            config.max_touches
        );
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(BotError::Config("no instruments configured".to_string()));
        }
        if !(self.stake > 0.0) {
            return Err(BotError::Config(format!("stake must be positive, got {}", self.stake)));
        }
        if self.pivot_depth == 0 {
            return Err(BotError::Config("pivot depth must be at least 1".to_string()));
        }
        if self.max_touches == 0 {
            return Err(BotError::Config("max touches must be at least 1".to_string()));
        }
        if self.long_bars == 0 || self.short_bars == 0 {
            return Err(BotError::Config("buffer sizes must be non-zero".to_string()));
        }
        if self.long_granularity_secs == self.short_granularity_secs {
            return Err(BotError::Config("long and short granularities must differ".to_string()));
        }
        Ok(())
    }

    pub fn instrument(&self, symbol: &str) -> Option<&InstrumentConfig> {
        self.instruments.get(symbol)
    }

    pub fn cooldown_secs(&self) -> i64 {
        i64::from(self.cooldown_minutes) * 60
    }

    /// Timeframe a feed of `granularity_secs` bars belongs to, if either.
    pub fn timeframe_for(&self, granularity_secs: u32) -> Option<Timeframe> {
        Timeframe::from_granularity(
            granularity_secs,
            self.long_granularity_secs,
            self.short_granularity_secs,
        )
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_token.is_some() && self.telegram_chat_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.instrument("R_10").map(|i| i.expiry_minutes), Some(30));
        assert_eq!(config.cooldown_secs(), 300);
        assert!(!config.telegram_enabled());
    }

    #[test]
    fn test_parse_instruments() {
        let parsed = parse_instruments("R_10:30:Volatility 10, R_50:5").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["R_10"], InstrumentConfig::new("Volatility 10", 30));
        assert_eq!(parsed["R_50"], InstrumentConfig::new("R_50", 5));
        assert!(parse_instruments("R_10:abc").is_err());
    }

    #[test]
    fn test_backstep_may_reach_depth() {
        let config = BotConfig {
            pivot_depth: 3,
            pivot_backstep: 5,
            ..BotConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_equal_granularities() {
        let config = BotConfig {
            short_granularity_secs: 900,
            ..BotConfig::default()
        };
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn test_timeframe_for_granularity() {
        let config = BotConfig::default();
        assert_eq!(config.timeframe_for(900), Some(Timeframe::Long));
        assert_eq!(config.timeframe_for(60), Some(Timeframe::Short));
        assert_eq!(config.timeframe_for(300), None);
    }
}
