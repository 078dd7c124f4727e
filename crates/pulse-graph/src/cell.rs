//! Cells: the typed nodes of the pulse graph.

use crate::channel::Colour;
use crate::id::{CellId, WireId};
use crate::pulse::Pulse;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a cell is. Behaviors dispatch on this, never on strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Empty placeholder, filled by a creation pulse.
    Slot,
    /// Plain conductor. The root is a relay.
    #[default]
    Relay,
    Recording,
    /// Turns raw pulses leaving it into creation pulses.
    Creation,
    /// Turns raw pulses leaving it into destruction pulses.
    Destruction,
    /// Swallows ping pulses.
    Stopper,
}

impl CellKind {
    pub const ALL: [CellKind; 6] = [
        CellKind::Slot,
        CellKind::Relay,
        CellKind::Recording,
        CellKind::Creation,
        CellKind::Destruction,
        CellKind::Stopper,
    ];

    /// A creation pulse passing through picks this cell up as its template.
    pub fn is_cloneable(self) -> bool {
        matches!(
            self,
            CellKind::Recording | CellKind::Creation | CellKind::Destruction | CellKind::Stopper
        )
    }

    /// A destruction pulse stops here and empties the cell.
    pub fn is_destroyable(self) -> bool {
        self.is_cloneable()
    }

    pub fn name(self) -> &'static str {
        match self {
            CellKind::Slot => "slot",
            CellKind::Relay => "relay",
            CellKind::Recording => "recording",
            CellKind::Creation => "creation",
            CellKind::Destruction => "destruction",
            CellKind::Stopper => "stopper",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transient marker set by a `Tag` operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTag {
    /// The cell was filled by a creation pulse this beat.
    JustCreated,
}

/// Shape a creation pulse stamps onto the slot it lands in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellTemplate {
    pub kind: CellKind,
    /// Where the template was taken from.
    pub position: Vector2,
}

impl CellTemplate {
    pub fn of(cell: &Cell) -> Self {
        Self {
            kind: cell.kind,
            position: cell.position,
        }
    }

    /// Used when a creation pulse reaches a slot without passing a cloneable cell.
    pub fn fallback(position: Vector2) -> Self {
        Self {
            kind: CellKind::Recording,
            position,
        }
    }
}

/// The three pulse slots of a cell, one per colour.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fire {
    pub red: Option<Pulse>,
    pub green: Option<Pulse>,
    pub blue: Option<Pulse>,
}

impl Fire {
    pub fn get(&self, colour: Colour) -> Option<&Pulse> {
        match colour {
            Colour::Red => self.red.as_ref(),
            Colour::Green => self.green.as_ref(),
            Colour::Blue => self.blue.as_ref(),
        }
    }

    pub fn set(&mut self, colour: Colour, pulse: Option<Pulse>) {
        let slot = match colour {
            Colour::Red => &mut self.red,
            Colour::Green => &mut self.green,
            Colour::Blue => &mut self.blue,
        };
        *slot = pulse;
    }

    /// True if any colour holds a pulse.
    pub fn is_lit(&self) -> bool {
        self.red.is_some() || self.green.is_some() || self.blue.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// `None` only for the root.
    pub parent: Option<CellId>,
    pub kind: CellKind,
    pub position: Vector2,
    pub children: Vec<CellId>,
    /// Wires ending here, in insertion order. Peaks fold them in this order.
    pub inputs: Vec<WireId>,
    pub outputs: Vec<WireId>,
    pub fire: Fire,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<CellTag>,
}

impl Cell {
    pub fn new(id: CellId, parent: Option<CellId>, kind: CellKind, position: Vector2) -> Self {
        Self {
            id,
            parent,
            kind,
            position,
            children: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            fire: Fire::default(),
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: CellTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn tag(&mut self, tag: CellTag) {
        if !self.has_tag(tag) {
            self.tags.push(tag);
        }
    }
}

/// Partial update for a cell. `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CellKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CellId>,
}

impl CellPatch {
    pub fn kind(kind: CellKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn position(position: Vector2) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn parent(parent: CellId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.position.is_none() && self.parent.is_none()
    }
}

/// Filling a slot from a template changes its kind; the slot keeps its place.
impl From<CellTemplate> for CellPatch {
    fn from(template: CellTemplate) -> Self {
        Self::kind(template.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_slots_are_independent() {
        let mut fire = Fire::default();
        assert!(!fire.is_lit());

        fire.set(Colour::Green, Some(Pulse::Raw));
        assert!(fire.is_lit());
        assert_eq!(fire.get(Colour::Green), Some(&Pulse::Raw));
        assert_eq!(fire.get(Colour::Red), None);

        fire.clear();
        assert!(!fire.is_lit());
    }

    #[test]
    fn slots_and_relays_are_neither_cloneable_nor_destroyable() {
        for kind in [CellKind::Slot, CellKind::Relay] {
            assert!(!kind.is_cloneable());
            assert!(!kind.is_destroyable());
        }
        assert!(CellKind::Destruction.is_cloneable());
        assert!(CellKind::Recording.is_destroyable());
    }

    #[test]
    fn template_patch_only_changes_kind() {
        let template = CellTemplate {
            kind: CellKind::Stopper,
            position: Vector2::new(3.0, 4.0),
        };
        let patch = CellPatch::from(template);
        assert_eq!(patch.kind, Some(CellKind::Stopper));
        assert_eq!(patch.position, None);
    }

    #[test]
    fn tagging_twice_keeps_one_tag() {
        let mut cell = Cell::new(CellId::ROOT, None, CellKind::Relay, Vector2::default());
        cell.tag(CellTag::JustCreated);
        cell.tag(CellTag::JustCreated);
        assert_eq!(cell.tags.len(), 1);
    }
}
