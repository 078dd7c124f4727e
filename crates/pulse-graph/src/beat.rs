//! The beat driver.
//!
//! Each beat evaluates every cell in every colour against the live store,
//! applies the collected operations, and then advances the store by one
//! projected tick. The store as it stood before advancing is kept as the
//! nearest past snapshot for later queries.

use crate::apply::apply_operations;
use crate::channel::{Colour, Timing};
use crate::context::Context;
use crate::error::Result;
use crate::evaluator::{EvalStats, Evaluator};
use crate::id::CellId;
use crate::ledger::{Ledger, LedgerKind};
use crate::operation::Operation;
use crate::peak::Peak;
use crate::store::Store;
use log::debug;
use serde::Serialize;

/// How many past stores a [`Pulsar`] keeps unless told otherwise.
pub const DEFAULT_HISTORY: usize = 8;

/// What one beat did, in the order it happened.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChangeLog {
    pub beat: u64,
    /// Cells whose peak succeeded in at least one colour.
    pub firing: Vec<CellId>,
    /// Operations applied to the store.
    pub operations: Vec<Operation>,
    /// Cells that answered a ping.
    pub pongs: Vec<CellId>,
    pub stats: EvalStats,
}

#[cfg(feature = "cli")]
impl ChangeLog {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Owns a live store and drives it beat by beat.
pub struct Pulsar {
    ctx: Context,
    store: Store,
    beat: u64,
    /// Stores from earlier beats, most recent first.
    history: Vec<Store>,
    history_limit: usize,
    ledger: Ledger,
}

impl Pulsar {
    pub fn new(ctx: Context) -> Self {
        Self::with_store(ctx, Store::new())
    }

    pub fn with_store(ctx: Context, store: Store) -> Self {
        Self {
            ctx,
            store,
            beat: 0,
            history: Vec::new(),
            history_limit: DEFAULT_HISTORY,
            ledger: Ledger::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// For editing the graph between beats.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn beat_count(&self) -> u64 {
        self.beat
    }

    pub fn history(&self) -> &[Store] {
        &self.history
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        self.history.truncate(limit);
    }

    pub fn enable_ledger(&mut self) {
        self.ledger.enable();
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Store a raw pulse on `id`, to be seen by the next beat.
    pub fn fire(&mut self, id: CellId, colour: Colour) -> Result<()> {
        self.store.fire_cell(&self.ctx, id, colour)?;
        self.ledger
            .record(self.beat, LedgerKind::Fired { cell: id, colour });
        Ok(())
    }

    /// Peak of `id` against the live store and the kept history.
    pub fn peak(&self, id: CellId, colour: Colour, timing: Timing) -> Result<Peak> {
        Evaluator::with_history(&self.ctx, &self.store, &self.history, &[]).peak(id, colour, timing)
    }

    pub fn is_firing(&self, id: CellId) -> Result<bool> {
        Evaluator::with_history(&self.ctx, &self.store, &self.history, &[]).is_firing(id)
    }

    /// Run one beat.
    pub fn beat(&mut self) -> Result<ChangeLog> {
        self.beat += 1;
        let beat = self.beat;

        let mut firing = Vec::new();
        let mut operations: Vec<Operation> = Vec::new();
        let stats = {
            let mut evaluator =
                Evaluator::with_history(&self.ctx, &self.store, &self.history, &[]);
            for cell in self.store.cells() {
                let mut fired = false;
                for colour in Colour::ALL {
                    let peak = evaluator.peak(cell.id, colour, Timing::Now)?;
                    if !peak.is_success() {
                        continue;
                    }
                    fired = true;
                    for operation in peak.into_operations() {
                        if !operations.contains(&operation) {
                            operations.push(operation);
                        }
                    }
                }
                if fired {
                    firing.push(cell.id);
                }
            }
            evaluator.stats()
        };
        debug!(
            "beat {beat}: {} firing, {} operations, {stats:?}",
            firing.len(),
            operations.len()
        );

        self.store.clear_tags();
        let applied = apply_operations(&self.ctx, &mut self.store, &operations)?;
        for operation in &applied.operations {
            self.ledger.record(
                beat,
                LedgerKind::Applied {
                    operation: operation.clone(),
                },
            );
        }
        for &cell in &applied.pongs {
            self.ledger.record(beat, LedgerKind::Pong { cell });
        }

        let advanced = self.store.project(&self.ctx)?;
        let previous = std::mem::replace(&mut self.store, advanced);
        if self.history_limit > 0 {
            self.history.insert(0, previous);
            self.history.truncate(self.history_limit);
        }

        Ok(ChangeLog {
            beat,
            firing,
            operations: applied.operations,
            pongs: applied.pongs,
            stats,
        })
    }

    /// Run `count` beats, collecting their change-logs.
    pub fn run(&mut self, count: u64) -> Result<Vec<ChangeLog>> {
        (0..count).map(|_| self.beat()).collect()
    }
}
