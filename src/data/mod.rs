// src/data/mod.rs
pub mod candle_series;
pub mod csv_loader;

pub use candle_series::{BarUpdate, CandleSeries};
pub use csv_loader::{granularity_secs, load_candles_csv};
