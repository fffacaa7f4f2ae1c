// src/data/csv_loader.rs
// Reads `time,open,high,low,close` candle files for offline replays.

use crate::errors::Result;
use crate::types::Candle;
use log::info;
use std::io::Read;
use std::path::Path;

pub fn load_candles_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let candles = read_candles(file)?;
    info!("📂 Loaded {} candles from {:?}", candles.len(), path);
    Ok(candles)
}

pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for record in csv_reader.deserialize::<Candle>() {
        candles.push(record?);
    }
    candles.sort_by_key(|c| c.time);
    Ok(candles)
}

/// Bar spacing of a time-sorted series: the smallest positive gap between
/// neighbours, so missing bars do not skew it.
pub fn granularity_secs(candles: &[Candle]) -> Option<u32> {
    candles
        .windows(2)
        .map(|pair| pair[1].time - pair[0].time)
        .filter(|gap| *gap > 0)
        .min()
        .and_then(|gap| u32::try_from(gap).ok())
}
