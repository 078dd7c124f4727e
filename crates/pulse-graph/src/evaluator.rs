//! Peak evaluation across the present and imagined neighbouring ticks.
//!
//! A query at timing `Now` folds a cell's inputs through the behavior table.
//! A query at `Past` or `Future` steps to the neighbouring frame, projecting
//! one if the caller supplied no snapshot there. Two things bound the walk:
//!
//! - a memo keyed by `(frame offset, cell, colour)`; re-entering a key that
//!   is still being computed yields `Fail`,
//! - a projection equal to the frame it came from, or to the frame on the
//!   far side of it, is a fixed point and the query ends with `Fail`.
//!
//! A peak that read a re-entered key belonging to an outer computation only
//! holds for that call chain, so it is not memoised. Cached peaks therefore
//! match what a fresh evaluator returns, whatever the query order.

use crate::behavior::{self, Hop};
use crate::channel::{Colour, Timing};
use crate::context::Context;
use crate::error::{PulseError, Result};
use crate::id::CellId;
use crate::operation::Operations;
use crate::peak::Peak;
use crate::store::Store;
use crate::timeline::Timeline;
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MemoKey {
    offset: i32,
    cell: CellId,
    colour: Colour,
}

#[derive(Clone, Debug)]
enum Memo {
    /// Being computed, at this nesting depth.
    Pending(usize),
    Done(Peak),
}

/// Counters for one evaluator's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EvalStats {
    /// Peaks actually computed, memo hits excluded.
    pub computed: usize,
    pub memo_hits: usize,
    /// Stores synthesized by projection.
    pub projections: usize,
    /// Directed steps cut short by a repeated state.
    pub fixed_points: usize,
    /// Largest distance from the present frame reached.
    pub deepest: u32,
}

/// Evaluates peaks against one present store and its history.
///
/// Reuse one evaluator for many queries over the same store to share the
/// memo and the projected frames.
pub struct Evaluator<'a> {
    ctx: Context,
    timeline: Timeline<'a>,
    memo: FxHashMap<MemoKey, Memo>,
    /// Number of `Now` computations in progress.
    depth: usize,
    /// Shallowest pending depth re-entered by the current computation.
    reentered: Option<usize>,
    /// Offsets whose projection turned out to repeat a known state.
    dead_ends: FxHashSet<i32>,
    stats: EvalStats,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &Context, store: &'a Store) -> Self {
        Self::with_history(ctx, store, &[], &[])
    }

    /// `past` and `future` are concrete snapshots, nearest first.
    pub fn with_history(
        ctx: &Context,
        store: &'a Store,
        past: &'a [Store],
        future: &'a [Store],
    ) -> Self {
        Self {
            ctx: *ctx,
            timeline: Timeline::new(store, past, future),
            memo: FxHashMap::default(),
            depth: 0,
            reentered: None,
            dead_ends: FxHashSet::default(),
            stats: EvalStats::default(),
        }
    }

    pub fn stats(&self) -> EvalStats {
        self.stats
    }

    pub fn peak(&mut self, id: CellId, colour: Colour, timing: Timing) -> Result<Peak> {
        let present = self
            .timeline
            .frame(0)
            .ok_or(PulseError::NotFound(id.into()))?;
        present.cell(id)?;
        self.peak_at(0, id, colour, timing)
    }

    /// `Success` at timing `Now` in any colour.
    pub fn is_firing(&mut self, id: CellId) -> Result<bool> {
        for colour in Colour::ALL {
            if self.peak(id, colour, Timing::Now)?.is_success() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn peak_at(&mut self, offset: i32, id: CellId, colour: Colour, timing: Timing) -> Result<Peak> {
        match timing {
            Timing::Now => self.peak_now(offset, id, colour),
            Timing::Past | Timing::Future => self.directed_peak(offset, id, colour, timing.step()),
        }
    }

    fn peak_now(&mut self, offset: i32, id: CellId, colour: Colour) -> Result<Peak> {
        let key = MemoKey {
            offset,
            cell: id,
            colour,
        };
        match self.memo.get(&key) {
            Some(Memo::Done(peak)) => {
                self.stats.memo_hits += 1;
                return Ok(peak.clone());
            }
            Some(&Memo::Pending(depth)) => {
                trace!("{id} {colour} re-entered at frame {offset}");
                self.reentered = Some(self.reentered.map_or(depth, |low| low.min(depth)));
                return Ok(Peak::fail());
            }
            None => {}
        }

        let depth = self.depth;
        self.depth += 1;
        self.memo.insert(key, Memo::Pending(depth));
        let outer = self.reentered.take();
        let result = self.compute_now(offset, id, colour);
        self.depth -= 1;

        // Re-entering this key itself is fine; an outer key taints the result.
        let tainted = self.reentered.filter(|&low| low < depth);
        self.reentered = match (outer, tainted) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match &result {
            Ok(peak) if tainted.is_none() => {
                self.memo.insert(key, Memo::Done(peak.clone()));
            }
            _ => {
                self.memo.remove(&key);
            }
        }
        result
    }

    fn compute_now(&mut self, offset: i32, id: CellId, colour: Colour) -> Result<Peak> {
        let Some(frame) = self.timeline.frame(offset) else {
            return Ok(Peak::fail());
        };
        let target = match frame.cell(id) {
            Ok(cell) => cell,
            // Snapshots may predate or outlive the cell.
            Err(PulseError::NotFound(_)) if offset != 0 => return Ok(Peak::fail()),
            Err(err) => return Err(err),
        };
        self.stats.computed += 1;

        let mut peak = Peak::new(target.fire.get(colour).cloned(), Operations::new());
        if peak.is_final() {
            return Ok(peak);
        }
        for &input in &target.inputs {
            let wire = frame.wire(input)?;
            if !wire.colour.admits(colour) {
                continue;
            }
            let source = frame.cell(wire.source)?;
            let next = self.peak_at(offset, source.id, colour, wire.timing.flip())?;
            let hop = Hop {
                source,
                target,
                wire,
            };
            peak = behavior::fold(peak, next, &hop)?;
            if peak.is_final() {
                break;
            }
        }
        Ok(peak)
    }

    fn directed_peak(
        &mut self,
        offset: i32,
        id: CellId,
        colour: Colour,
        step: i32,
    ) -> Result<Peak> {
        let next = offset + step;
        if self.dead_ends.contains(&next) {
            return Ok(Peak::fail());
        }
        if !self.timeline.contains(next) {
            let Some(current) = self.timeline.frame(offset) else {
                return Ok(Peak::fail());
            };
            let projected = current.project(&self.ctx)?;
            self.stats.projections += 1;

            let behind = self.timeline.frame(offset - step);
            let repeated = projected.same_state(&current)
                || behind.is_some_and(|frame| projected.same_state(&frame));
            if repeated {
                self.stats.fixed_points += 1;
                self.dead_ends.insert(next);
                debug!("fixed point at frame {next} while asking for {id} {colour}");
                return Ok(Peak::fail());
            }
            self.timeline.insert(next, projected);
            self.stats.deepest = self.stats.deepest.max(next.unsigned_abs());
        }
        self.peak_now(next, id, colour)
    }
}

/// Peak of `id` in `colour` at `timing`, relative to `store`.
///
/// `past` and `future` are concrete snapshots, nearest first. Missing
/// frames are projected from their neighbours.
pub fn get_peak(
    ctx: &Context,
    store: &Store,
    id: CellId,
    colour: Colour,
    timing: Timing,
    past: &[Store],
    future: &[Store],
) -> Result<Peak> {
    Evaluator::with_history(ctx, store, past, future).peak(id, colour, timing)
}

/// True if `id` fires now in any colour.
pub fn is_firing(ctx: &Context, store: &Store, id: CellId) -> Result<bool> {
    Evaluator::new(ctx, store).is_firing(id)
}
