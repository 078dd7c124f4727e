//! Beat ledger.
//!
//! Records what each beat did, for debugging and the CLI's change-logs.

use crate::channel::Colour;
use crate::id::CellId;
use crate::operation::Operation;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub beat: u64,
    pub kind: LedgerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerKind {
    /// A pulse was stored from outside.
    Fired { cell: CellId, colour: Colour },
    /// An operation reached the store.
    Applied { operation: Operation },
    Pong { cell: CellId },
}

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    enabled: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, beat: u64, kind: LedgerKind) {
        if self.enabled {
            self.entries.push(LedgerEntry { beat, kind });
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries_for_beat(&self, beat: u64) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.beat == beat).collect()
    }
}
