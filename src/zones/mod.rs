// src/zones/mod.rs
pub mod zone;
pub mod zone_detection;

pub use zone::{find_zone, find_zone_mut, Zone};
pub use zone_detection::{ZoneDetector, MIN_CANDLES, ZONE_WIDEN};
