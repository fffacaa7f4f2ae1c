// src/lib.rs
pub mod config;
pub mod data;
pub mod errors;
pub mod notifications;
pub mod patterns;
pub mod persistence;
pub mod trading;
pub mod types;
pub mod zones;

pub use config::BotConfig;
pub use errors::{BotError, Result};
pub use trading::{EngineOutput, MarketEvent, SignalEngine};
pub use types::{Candle, Direction, Polarity, Timeframe};
