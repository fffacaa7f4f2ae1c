// src/persistence/ledger_store.rs
// JSON file holding one record per settled trade.

use crate::errors::Result;
use crate::trading::events::{EngineOutput, OutputHandler};
use crate::trading::ledger::LedgerRecord;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub trait LedgerStore {
    fn load(&self) -> Result<Vec<LedgerRecord>>;
    fn save(&self, records: &[LedgerRecord]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonLedgerStore {
    /// A missing file is an empty ledger.
    fn load(&self) -> Result<Vec<LedgerRecord>> {
        if !self.path.exists() {
            info!("📂 No ledger at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let records: Vec<LedgerRecord> = serde_json::from_str(&content)?;
        info!("📂 {} results loaded from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn save(&self, records: &[LedgerRecord]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content)?;
        debug!("[LedgerStore] Saved {} records to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Output handler that rewrites the store after every settled trade.
/// Write failures are logged and never reach the engine.
pub struct LedgerWriter<S: LedgerStore> {
    store: S,
    records: Vec<LedgerRecord>,
}

impl<S: LedgerStore> LedgerWriter<S> {
    pub fn new(store: S, records: Vec<LedgerRecord>) -> Self {
        Self { store, records }
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }
}

impl<S: LedgerStore> OutputHandler for LedgerWriter<S> {
    fn handle(&mut self, output: EngineOutput) {
        if let EngineOutput::LedgerAppend(record) = output {
            self.records.push(record);
            if let Err(e) = self.store.save(&self.records) {
                warn!("[LedgerStore] Could not persist ledger: {}", e);
            }
        }
    }
}
