//! Store frames along the logical past/future axis.
//!
//! Frame offset 0 is the store a query started on. Negative offsets are the
//! caller's past snapshots (most recent first), positive offsets its future
//! snapshots. Frames the caller did not supply are synthesized by
//! [`Store::project`] on demand and kept for the rest of the query.

use crate::channel::Colour;
use crate::context::Context;
use crate::error::{PulseError, Result};
use crate::store::{Entity, Store};
use crate::validate;
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::Deref;
use std::rc::Rc;

/// Handle to one frame. Cloning never copies a store.
#[derive(Clone, Debug)]
pub enum Frame<'a> {
    Given(&'a Store),
    Projected(Rc<Store>),
}

impl Deref for Frame<'_> {
    type Target = Store;

    fn deref(&self) -> &Store {
        match self {
            Frame::Given(store) => store,
            Frame::Projected(store) => store,
        }
    }
}

#[derive(Debug)]
pub struct Timeline<'a> {
    frames: FxHashMap<i32, Frame<'a>>,
}

impl<'a> Timeline<'a> {
    pub fn new(present: &'a Store, past: &'a [Store], future: &'a [Store]) -> Self {
        let mut frames = FxHashMap::default();
        frames.insert(0, Frame::Given(present));
        for (offset, store) in (1..).zip(past) {
            frames.insert(-offset, Frame::Given(store));
        }
        for (offset, store) in (1..).zip(future) {
            frames.insert(offset, Frame::Given(store));
        }
        Self { frames }
    }

    pub fn frame(&self, offset: i32) -> Option<Frame<'a>> {
        self.frames.get(&offset).cloned()
    }

    pub fn contains(&self, offset: i32) -> bool {
        self.frames.contains_key(&offset)
    }

    pub fn insert(&mut self, offset: i32, store: Store) {
        trace!("frame {offset} projected");
        self.frames.insert(offset, Frame::Projected(Rc::new(store)));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl Store {
    /// The store one logical tick away with no outside input: pulses stay
    /// only on cells below a firing ancestor. Structure and tags are kept.
    ///
    /// The same projection serves both directions of the time axis.
    pub fn project(&self, ctx: &Context) -> Result<Store> {
        let mut keep = FxHashSet::default();
        for cell in self.cells() {
            if cell.fire.is_lit() && self.parent_chain_lit(cell.id)? {
                keep.insert(cell.id);
            }
        }

        let mut projected = self.clone();
        for entity in projected.entities_mut() {
            if let Entity::Cell(cell) = entity {
                if !keep.contains(&cell.id) {
                    cell.fire.clear();
                }
            }
        }
        if ctx.validate {
            validate::check_all(&projected)?;
        }
        Ok(projected)
    }

    /// True if no cell holds a pulse in any colour.
    pub fn is_quiet(&self) -> bool {
        self.cells().all(|cell| !cell.fire.is_lit())
    }
}

/// Advance every cell of one layer by a beat.
pub fn advance_layer(_store: &Store) -> Result<Store> {
    Err(PulseError::Unimplemented("advance across a whole layer"))
}

/// Advance a layer together with every layer nested inside it.
pub fn advance_deep(_store: &Store) -> Result<Store> {
    Err(PulseError::Unimplemented("deep advance into nested layers"))
}

/// Push one colour through every outgoing wire of the store at once.
pub fn fan_out(_store: &Store, _colour: Colour) -> Result<Store> {
    Err(PulseError::Unimplemented("colour-scoped fan-out"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellKind, Vector2};
    use crate::id::CellId;

    const CTX: Context = Context::debug();

    #[test]
    fn projection_clears_pulses_under_quiet_parents() {
        let mut store = Store::new();
        let group = store
            .create_cell(&CTX, CellId::ROOT, CellKind::Relay, Vector2::default())
            .unwrap();
        let inner = store
            .create_cell(&CTX, group, CellKind::Recording, Vector2::default())
            .unwrap();
        store.fire_cell(&CTX, group, Colour::Red).unwrap();
        store.fire_cell(&CTX, inner, Colour::Blue).unwrap();

        let once = store.project(&CTX).unwrap();
        assert!(!once.cell(group).unwrap().fire.is_lit());
        assert!(once.cell(inner).unwrap().fire.is_lit());

        let twice = once.project(&CTX).unwrap();
        assert!(twice.is_quiet());
        assert!(twice.project(&CTX).unwrap().same_state(&twice));
    }

    #[test]
    fn projection_is_a_copy() {
        let mut store = Store::new();
        store.fire_cell(&CTX, CellId::ROOT, Colour::Green).unwrap();
        let projected = store.project(&CTX).unwrap();
        assert!(projected.is_quiet());
        assert!(store.cell(CellId::ROOT).unwrap().fire.is_lit());
    }

    #[test]
    fn timeline_orders_snapshots_outward() {
        let present = Store::new();
        let past = vec![Store::new(), Store::new()];
        let future = vec![Store::new()];
        let timeline = Timeline::new(&present, &past, &future);

        assert_eq!(timeline.len(), 4);
        assert!(timeline.contains(-2));
        assert!(timeline.contains(1));
        assert!(!timeline.contains(2));
        assert!(matches!(timeline.frame(0), Some(Frame::Given(_))));
    }

    #[test]
    fn unfinished_paths_report_unimplemented() {
        let store = Store::new();
        assert!(matches!(
            advance_layer(&store),
            Err(PulseError::Unimplemented(_))
        ));
        assert!(matches!(
            advance_deep(&store),
            Err(PulseError::Unimplemented(_))
        ));
        assert!(matches!(
            fan_out(&store, Colour::Red),
            Err(PulseError::Unimplemented(_))
        ));
    }
}
