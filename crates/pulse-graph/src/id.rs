//! Identifier space shared by cells and wires.
//!
//! One signed integer space: non-negative ids name cells (0 is the root),
//! negative ids name wires. Telling them apart is a sign check, which lets
//! the store keep both in a single table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Any id in the store, cell or wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub i32);

impl Id {
    pub fn is_cell(self) -> bool {
        self.0 >= 0
    }

    pub fn is_wire(self) -> bool {
        self.0 < 0
    }

    pub fn as_cell(self) -> Option<CellId> {
        CellId::from_raw(self.0)
    }

    pub fn as_wire(self) -> Option<WireId> {
        WireId::from_raw(self.0)
    }

    /// "cell" or "wire", for error messages.
    pub fn noun(self) -> &'static str {
        if self.is_cell() { "cell" } else { "wire" }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.noun(), self.0)
    }
}

/// Id of a cell. Always non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct CellId(i32);

impl CellId {
    pub const ROOT: Self = Self(0);

    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw >= 0).then_some(Self(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// Id of a wire. Always negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct WireId(i32);

impl WireId {
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw < 0).then_some(Self(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<CellId> for Id {
    fn from(id: CellId) -> Self {
        Id(id.0)
    }
}

impl From<WireId> for Id {
    fn from(id: WireId) -> Self {
        Id(id.0)
    }
}

impl From<CellId> for i32 {
    fn from(id: CellId) -> Self {
        id.0
    }
}

impl From<WireId> for i32 {
    fn from(id: WireId) -> Self {
        id.0
    }
}

impl TryFrom<i32> for CellId {
    type Error = String;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or_else(|| format!("{raw} is not a cell id"))
    }
}

impl TryFrom<i32> for WireId {
    type Error = String;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or_else(|| format!("{raw} is not a wire id"))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Id::from(*self).fmt(f)
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Id::from(*self).fmt(f)
    }
}

/// Mints ids and recycles freed ones.
///
/// Cells count up from 0, wires count down from -1. Each side has its own
/// LIFO free-list that is consulted before a fresh id is minted. Archived
/// ids sit in `held` and are only recycled after [`IdAllocator::purge`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_cell: i32,
    next_wire: i32,
    free_cells: Vec<CellId>,
    free_wires: Vec<WireId>,
    held: Vec<Id>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_cell: 0,
            next_wire: -1,
            free_cells: Vec::new(),
            free_wires: Vec::new(),
            held: Vec::new(),
        }
    }

    pub fn alloc_cell(&mut self) -> CellId {
        if let Some(id) = self.free_cells.pop() {
            return id;
        }
        let id = CellId(self.next_cell);
        self.next_cell += 1;
        id
    }

    pub fn alloc_wire(&mut self) -> WireId {
        if let Some(id) = self.free_wires.pop() {
            return id;
        }
        let id = WireId(self.next_wire);
        self.next_wire -= 1;
        id
    }

    /// Return an id to its free-list.
    pub fn release(&mut self, id: Id) {
        match id.as_cell() {
            Some(cell) => self.free_cells.push(cell),
            None => self.free_wires.push(WireId(id.0)),
        }
    }

    /// Withhold an id from reuse until the next purge.
    pub fn hold(&mut self, id: Id) {
        self.held.push(id);
    }

    pub fn is_held(&self, id: Id) -> bool {
        self.held.contains(&id)
    }

    /// Release every held id, returning them in the order they were held.
    pub fn purge(&mut self) -> Vec<Id> {
        let held = std::mem::take(&mut self.held);
        for &id in &held {
            self.release(id);
        }
        held
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_splits_cells_and_wires() {
        assert!(Id(0).is_cell());
        assert!(Id(7).is_cell());
        assert!(Id(-1).is_wire());
        assert_eq!(Id(-3).as_wire().map(WireId::raw), Some(-3));
        assert!(Id(-3).as_cell().is_none());
        assert!(CellId::from_raw(-1).is_none());
        assert!(WireId::from_raw(0).is_none());
    }

    #[test]
    fn cells_count_up_and_wires_count_down() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.alloc_cell(), CellId::ROOT);
        assert_eq!(ids.alloc_cell().raw(), 1);
        assert_eq!(ids.alloc_wire().raw(), -1);
        assert_eq!(ids.alloc_wire().raw(), -2);
    }

    #[test]
    fn freed_ids_come_back_last_in_first_out() {
        let mut ids = IdAllocator::new();
        let a = ids.alloc_cell();
        let b = ids.alloc_cell();
        ids.release(a.into());
        ids.release(b.into());

        assert_eq!(ids.alloc_cell(), b);
        assert_eq!(ids.alloc_cell(), a);
        assert_eq!(ids.alloc_cell().raw(), 2);
    }

    #[test]
    fn held_ids_wait_for_purge() {
        let mut ids = IdAllocator::new();
        let _root = ids.alloc_cell();
        let a = ids.alloc_cell();
        ids.hold(a.into());

        assert!(ids.is_held(a.into()));
        assert_ne!(ids.alloc_cell(), a);

        assert_eq!(ids.purge(), vec![Id::from(a)]);
        assert!(!ids.is_held(a.into()));
        assert_eq!(ids.alloc_cell(), a);
    }

    #[test]
    fn display_names_the_side() {
        assert_eq!(CellId::ROOT.to_string(), "cell#0");
        assert_eq!(Id(-4).to_string(), "wire#-4");
    }
}
