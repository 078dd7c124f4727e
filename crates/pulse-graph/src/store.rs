//! The store: one arena holding every cell and wire, addressed by id.
//!
//! Cycles in the graph are just integers here, so cloning the store for a
//! projection is a plain structural copy.

use crate::cell::{Cell, CellKind, CellPatch, CellTag, Vector2};
use crate::channel::{Colour, Timing, WireColour};
use crate::context::Context;
use crate::error::{PulseError, Result};
use crate::id::{CellId, Id, IdAllocator, WireId};
use crate::pulse::Pulse;
use crate::validate;
use crate::wire::{Wire, WirePatch};
use indexmap::IndexMap;
use log::{debug, trace};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

type Table = IndexMap<Id, Entity, FxBuildHasher>;

/// One row of the store table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    Cell(Cell),
    Wire(Wire),
}

impl Entity {
    pub fn id(&self) -> Id {
        match self {
            Entity::Cell(cell) => cell.id.into(),
            Entity::Wire(wire) => wire.id.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Store {
    entities: Table,
    /// Archived rows: invisible to lookups and iteration until purged.
    archived: Table,
    ids: IdAllocator,
}

impl Store {
    /// An empty store holding only the root cell.
    pub fn new() -> Self {
        let mut ids = IdAllocator::new();
        let root = ids.alloc_cell();
        let mut entities = Table::default();
        entities.insert(
            root.into(),
            Entity::Cell(Cell::new(root, None, CellKind::Relay, Vector2::default())),
        );
        Self {
            entities,
            archived: Table::default(),
            ids,
        }
    }

    pub fn root(&self) -> CellId {
        CellId::ROOT
    }

    // --- Lookup ---

    pub fn get(&self, id: Id) -> Result<&Entity> {
        self.entities.get(&id).ok_or(PulseError::NotFound(id))
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        match self.get(id.into())? {
            Entity::Cell(cell) => Ok(cell),
            Entity::Wire(_) => Err(PulseError::WrongKind(id.into(), "cell")),
        }
    }

    pub fn wire(&self, id: WireId) -> Result<&Wire> {
        match self.get(id.into())? {
            Entity::Wire(wire) => Ok(wire),
            Entity::Cell(_) => Err(PulseError::WrongKind(id.into(), "wire")),
        }
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        match self.entities.get_mut(&Id::from(id)) {
            Some(Entity::Cell(cell)) => Ok(cell),
            Some(Entity::Wire(_)) => Err(PulseError::WrongKind(id.into(), "cell")),
            None => Err(PulseError::NotFound(id.into())),
        }
    }

    pub(crate) fn wire_mut(&mut self, id: WireId) -> Result<&mut Wire> {
        match self.entities.get_mut(&Id::from(id)) {
            Some(Entity::Wire(wire)) => Ok(wire),
            Some(Entity::Cell(_)) => Err(PulseError::WrongKind(id.into(), "wire")),
            None => Err(PulseError::NotFound(id.into())),
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn is_archived(&self, id: Id) -> bool {
        self.archived.contains_key(&id)
    }

    /// Live cells in creation order. Each call starts a fresh pass.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.entities.values().filter_map(|entity| match entity {
            Entity::Cell(cell) => Some(cell),
            Entity::Wire(_) => None,
        })
    }

    /// Live wires in creation order. Each call starts a fresh pass.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.entities.values().filter_map(|entity| match entity {
            Entity::Wire(wire) => Some(wire),
            Entity::Cell(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Never true: the root is always present.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Same cells and wires, regardless of id pools or row order.
    pub fn same_state(&self, other: &Store) -> bool {
        self.entities == other.entities
    }

    /// True if a strict ancestor of `id` holds a pulse in any colour.
    pub fn parent_chain_lit(&self, id: CellId) -> Result<bool> {
        let mut current = self.cell(id)?.parent;
        let mut steps = 0;
        while let Some(parent_id) = current {
            let parent = self.cell(parent_id)?;
            if parent.fire.is_lit() {
                return Ok(true);
            }
            current = parent.parent;
            steps += 1;
            if steps > self.entities.len() {
                return Err(PulseError::ValidationFailed {
                    id: id.into(),
                    reason: "parent chain does not reach the root".to_string(),
                });
            }
        }
        Ok(false)
    }

    /// `id` and all of its descendants, children before parents.
    pub fn subtree(&self, id: CellId) -> Result<Vec<CellId>> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            for &child in self.cell(current)?.children.iter().rev() {
                stack.push((child, false));
            }
        }
        Ok(order)
    }

    // --- Creation ---

    pub fn create_cell(
        &mut self,
        ctx: &Context,
        parent: CellId,
        kind: CellKind,
        position: Vector2,
    ) -> Result<CellId> {
        self.cell(parent)?;
        let id = self.ids.alloc_cell();
        self.entities
            .insert(id.into(), Entity::Cell(Cell::new(id, Some(parent), kind, position)));
        self.cell_mut(parent)?.children.push(id);
        trace!("created {id} ({kind}) under {parent}");
        self.validated(ctx, [Id::from(id), Id::from(parent)])?;
        Ok(id)
    }

    pub fn create_wire(
        &mut self,
        ctx: &Context,
        source: CellId,
        target: CellId,
        colour: WireColour,
        timing: Timing,
    ) -> Result<WireId> {
        self.cell(source)?;
        self.cell(target)?;
        let id = self.ids.alloc_wire();
        self.entities.insert(
            id.into(),
            Entity::Wire(Wire {
                id,
                source,
                target,
                colour,
                timing,
            }),
        );
        self.cell_mut(source)?.outputs.push(id);
        self.cell_mut(target)?.inputs.push(id);
        trace!("created {id} {source} -> {target} ({colour:?}, {timing:?})");
        self.validated(ctx, [Id::from(id), Id::from(source), Id::from(target)])?;
        Ok(id)
    }

    // --- Firing ---

    /// Store a raw pulse on `id` for `colour`.
    pub fn fire_cell(&mut self, ctx: &Context, id: CellId, colour: Colour) -> Result<()> {
        self.fire(ctx, id, colour, Pulse::Raw)
    }

    pub fn fire(&mut self, ctx: &Context, id: CellId, colour: Colour, pulse: Pulse) -> Result<()> {
        trace!("fire {id} {colour} {:?}", pulse.kind());
        self.cell_mut(id)?.fire.set(colour, Some(pulse));
        self.validated(ctx, [Id::from(id)])
    }

    pub fn clear_fire(&mut self, ctx: &Context, id: CellId, colour: Colour) -> Result<()> {
        self.cell_mut(id)?.fire.set(colour, None);
        self.validated(ctx, [Id::from(id)])
    }

    // --- Tags ---

    pub fn tag(&mut self, ctx: &Context, id: CellId, tag: CellTag) -> Result<()> {
        self.cell_mut(id)?.tag(tag);
        self.validated(ctx, [Id::from(id)])
    }

    /// Drop every transient tag.
    pub fn clear_tags(&mut self) {
        for entity in self.entities.values_mut() {
            if let Entity::Cell(cell) = entity {
                cell.tags.clear();
            }
        }
    }

    // --- Modification ---

    pub fn modify_cell(&mut self, ctx: &Context, id: CellId, patch: CellPatch) -> Result<()> {
        let mut touched: Vec<Id> = vec![id.into()];
        if let Some(new_parent) = patch.parent {
            let old_parent = self.reparent(id, new_parent)?;
            touched.push(old_parent.into());
            touched.push(new_parent.into());
        }
        let cell = self.cell_mut(id)?;
        if let Some(kind) = patch.kind {
            cell.kind = kind;
        }
        if let Some(position) = patch.position {
            cell.position = position;
        }
        self.validated(ctx, touched)
    }

    /// Move `id` under `new_parent`, returning the old parent.
    fn reparent(&mut self, id: CellId, new_parent: CellId) -> Result<CellId> {
        let old_parent = self.cell(id)?.parent.ok_or(PulseError::RootImmovable)?;
        self.cell(new_parent)?;
        if self.subtree(id)?.contains(&new_parent) {
            return Err(PulseError::CyclicParent {
                cell: id,
                parent: new_parent,
            });
        }
        if old_parent == new_parent {
            return Ok(old_parent);
        }
        self.cell_mut(old_parent)?.children.retain(|&child| child != id);
        self.cell_mut(new_parent)?.children.push(id);
        self.cell_mut(id)?.parent = Some(new_parent);
        Ok(old_parent)
    }

    pub fn modify_wire(&mut self, ctx: &Context, id: WireId, patch: WirePatch) -> Result<()> {
        let (old_source, old_target) = {
            let wire = self.wire(id)?;
            (wire.source, wire.target)
        };
        let mut touched: Vec<Id> = vec![id.into()];

        if let Some(source) = patch.source.filter(|&source| source != old_source) {
            self.cell(source)?;
            self.cell_mut(old_source)?.outputs.retain(|&wire| wire != id);
            self.cell_mut(source)?.outputs.push(id);
            self.wire_mut(id)?.source = source;
            touched.extend([Id::from(old_source), Id::from(source)]);
        }
        if let Some(target) = patch.target.filter(|&target| target != old_target) {
            self.cell(target)?;
            self.cell_mut(old_target)?.inputs.retain(|&wire| wire != id);
            self.cell_mut(target)?.inputs.push(id);
            self.wire_mut(id)?.target = target;
            touched.extend([Id::from(old_target), Id::from(target)]);
        }

        let wire = self.wire_mut(id)?;
        if let Some(colour) = patch.colour {
            wire.colour = colour;
        }
        if let Some(timing) = patch.timing {
            wire.timing = timing;
        }
        self.validated(ctx, touched)
    }

    // --- Removal ---

    /// Delete a cell, its descendants and every wire touching any of them.
    /// All freed ids go back to the free pools; `id` itself is reused first.
    pub fn delete_cell(&mut self, ctx: &Context, id: CellId) -> Result<()> {
        self.remove_cell(ctx, id, Removal::Delete)
    }

    /// Like [`Store::delete_cell`], but the rows and ids are held aside
    /// until [`Store::purge_archive`].
    pub fn archive_cell(&mut self, ctx: &Context, id: CellId) -> Result<()> {
        self.remove_cell(ctx, id, Removal::Archive)
    }

    pub fn delete_wire(&mut self, ctx: &Context, id: WireId) -> Result<()> {
        self.remove_wire(ctx, id, Removal::Delete)
    }

    pub fn archive_wire(&mut self, ctx: &Context, id: WireId) -> Result<()> {
        self.remove_wire(ctx, id, Removal::Archive)
    }

    /// Forget archived rows and make their ids reusable.
    pub fn purge_archive(&mut self) -> Vec<Id> {
        self.archived.clear();
        let purged = self.ids.purge();
        debug!("purged {} archived ids", purged.len());
        purged
    }

    fn remove_cell(&mut self, ctx: &Context, id: CellId, removal: Removal) -> Result<()> {
        let parent = self.cell(id)?.parent.ok_or(PulseError::RootImmovable)?;
        let doomed = self.subtree(id)?;

        let mut wires: Vec<WireId> = Vec::new();
        for &cell_id in &doomed {
            let cell = self.cell(cell_id)?;
            for &wire in cell.inputs.iter().chain(&cell.outputs) {
                if !wires.contains(&wire) {
                    wires.push(wire);
                }
            }
        }

        let mut touched: Vec<Id> = vec![parent.into()];
        for wire in wires {
            let (source, target) = self.detach_wire(wire)?;
            for end in [source, target] {
                if !doomed.contains(&end) && !touched.contains(&Id::from(end)) {
                    touched.push(end.into());
                }
            }
            self.retire(wire.into(), removal);
        }

        self.cell_mut(parent)?.children.retain(|&child| child != id);
        // Subtree order puts `id` last, so a LIFO free-list hands it out first.
        for cell_id in doomed {
            self.retire(cell_id.into(), removal);
        }
        debug!("{removal:?} {id} (parent {parent})");
        self.validated(ctx, touched)
    }

    fn remove_wire(&mut self, ctx: &Context, id: WireId, removal: Removal) -> Result<()> {
        let (source, target) = self.detach_wire(id)?;
        self.retire(id.into(), removal);
        self.validated(ctx, [Id::from(source), Id::from(target)])
    }

    /// Unlink a wire from both of its cells, leaving the row in place.
    fn detach_wire(&mut self, id: WireId) -> Result<(CellId, CellId)> {
        let (source, target) = {
            let wire = self.wire(id)?;
            (wire.source, wire.target)
        };
        self.cell_mut(source)?.outputs.retain(|&wire| wire != id);
        self.cell_mut(target)?.inputs.retain(|&wire| wire != id);
        Ok((source, target))
    }

    fn retire(&mut self, id: Id, removal: Removal) {
        let Some(entity) = self.entities.shift_remove(&id) else {
            return;
        };
        match removal {
            Removal::Delete => self.ids.release(id),
            Removal::Archive => {
                self.archived.insert(id, entity);
                self.ids.hold(id);
            }
        }
    }

    fn validated(&self, ctx: &Context, ids: impl IntoIterator<Item = Id>) -> Result<()> {
        if !ctx.validate {
            return Ok(());
        }
        for id in ids {
            if self.contains(id) {
                validate::check(self, id)?;
            }
        }
        Ok(())
    }

    pub(crate) fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Removal {
    Delete,
    Archive,
}

#[cfg(feature = "cli")]
impl Store {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: Context = Context::debug();

    fn cell(store: &mut Store, parent: CellId, kind: CellKind) -> CellId {
        store
            .create_cell(&CTX, parent, kind, Vector2::default())
            .unwrap()
    }

    #[test]
    fn new_store_holds_only_root() {
        let store = Store::new();
        let root = store.cell(store.root()).unwrap();
        assert_eq!(root.parent, None);
        assert_eq!(store.cells().count(), 1);
        assert_eq!(store.wires().count(), 0);
    }

    #[test]
    fn create_links_parent_and_wire_ends() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let b = cell(&mut store, a, CellKind::Slot);
        let wire = store
            .create_wire(&CTX, a, b, WireColour::Red, Timing::Now)
            .unwrap();

        assert_eq!(store.cell(a).unwrap().children, vec![b]);
        assert_eq!(store.cell(b).unwrap().parent, Some(a));
        assert_eq!(store.cell(a).unwrap().outputs, vec![wire]);
        assert_eq!(store.cell(b).unwrap().inputs, vec![wire]);
        assert_eq!(store.wire(wire).unwrap().source, a);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store = Store::new();
        let ghost = CellId::from_raw(42).unwrap();
        assert_eq!(store.cell(ghost), Err(PulseError::NotFound(ghost.into())));
        assert!(matches!(
            store.wire(WireId::from_raw(-9).unwrap()),
            Err(PulseError::NotFound(_))
        ));
    }

    #[test]
    fn creating_under_missing_parent_fails_without_minting() {
        let mut store = Store::new();
        let ghost = CellId::from_raw(42).unwrap();
        let result = store.create_cell(&CTX, ghost, CellKind::Slot, Vector2::default());
        assert!(matches!(result, Err(PulseError::NotFound(_))));
        assert_eq!(cell(&mut store, CellId::ROOT, CellKind::Slot).raw(), 1);
    }

    #[test]
    fn delete_cascades_to_children_and_wires() {
        let mut store = Store::new();
        let outside = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let group = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let inner = cell(&mut store, group, CellKind::Recording);
        let into_inner = store
            .create_wire(&CTX, outside, inner, WireColour::Any, Timing::Now)
            .unwrap();
        let out_of_group = store
            .create_wire(&CTX, group, outside, WireColour::Any, Timing::Future)
            .unwrap();

        store.delete_cell(&CTX, group).unwrap();

        assert!(!store.contains(group.into()));
        assert!(!store.contains(inner.into()));
        assert!(!store.contains(into_inner.into()));
        assert!(!store.contains(out_of_group.into()));
        let outside = store.cell(outside).unwrap();
        assert!(outside.inputs.is_empty());
        assert!(outside.outputs.is_empty());
        assert_eq!(store.cell(CellId::ROOT).unwrap().children, vec![outside.id]);
    }

    #[test]
    fn deleted_id_is_reused_once() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let _b = cell(&mut store, CellId::ROOT, CellKind::Relay);
        store.delete_cell(&CTX, a).unwrap();

        assert_eq!(cell(&mut store, CellId::ROOT, CellKind::Slot), a);
        assert_eq!(cell(&mut store, CellId::ROOT, CellKind::Slot).raw(), 3);
    }

    #[test]
    fn archived_ids_are_withheld_until_purge() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        store.archive_cell(&CTX, a).unwrap();

        assert!(store.is_archived(a.into()));
        assert!(store.cells().all(|c| c.id != a));
        assert_ne!(cell(&mut store, CellId::ROOT, CellKind::Slot), a);

        assert_eq!(store.purge_archive(), vec![Id::from(a)]);
        assert!(!store.is_archived(a.into()));
        assert_eq!(cell(&mut store, CellId::ROOT, CellKind::Slot), a);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut store = Store::new();
        assert_eq!(
            store.delete_cell(&CTX, CellId::ROOT),
            Err(PulseError::RootImmovable)
        );
        assert_eq!(
            store.archive_cell(&CTX, CellId::ROOT),
            Err(PulseError::RootImmovable)
        );
    }

    #[test]
    fn reparenting_moves_between_children_lists() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let b = cell(&mut store, CellId::ROOT, CellKind::Relay);
        store.modify_cell(&CTX, b, CellPatch::parent(a)).unwrap();

        assert_eq!(store.cell(CellId::ROOT).unwrap().children, vec![a]);
        assert_eq!(store.cell(a).unwrap().children, vec![b]);
        assert_eq!(store.cell(b).unwrap().parent, Some(a));
    }

    #[test]
    fn reparenting_under_descendant_is_rejected() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let b = cell(&mut store, a, CellKind::Relay);
        assert_eq!(
            store.modify_cell(&CTX, a, CellPatch::parent(b)),
            Err(PulseError::CyclicParent { cell: a, parent: b })
        );
        assert_eq!(
            store.modify_cell(&CTX, a, CellPatch::parent(a)),
            Err(PulseError::CyclicParent { cell: a, parent: a })
        );
    }

    #[test]
    fn rewiring_moves_between_input_lists() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let b = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let c = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let wire = store
            .create_wire(&CTX, a, b, WireColour::Any, Timing::Now)
            .unwrap();

        let patch = WirePatch {
            target: Some(c),
            timing: Some(Timing::Past),
            ..WirePatch::default()
        };
        store.modify_wire(&CTX, wire, patch).unwrap();

        assert!(store.cell(b).unwrap().inputs.is_empty());
        assert_eq!(store.cell(c).unwrap().inputs, vec![wire]);
        assert_eq!(store.wire(wire).unwrap().timing, Timing::Past);
    }

    #[test]
    fn modify_changes_kind_and_position() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Slot);
        let patch = CellPatch {
            kind: Some(CellKind::Recording),
            position: Some(Vector2::new(5.0, -2.0)),
            parent: None,
        };
        store.modify_cell(&CTX, a, patch).unwrap();
        let a = store.cell(a).unwrap();
        assert_eq!(a.kind, CellKind::Recording);
        assert_eq!(a.position, Vector2::new(5.0, -2.0));
    }

    #[test]
    fn wrong_side_of_id_space() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let wire = store
            .create_wire(&CTX, a, a, WireColour::Any, Timing::Future)
            .unwrap();
        assert!(matches!(store.get(wire.into()), Ok(Entity::Wire(_))));
        assert!(matches!(store.get(a.into()), Ok(Entity::Cell(_))));
    }

    #[test]
    fn iteration_restarts() {
        let mut store = Store::new();
        cell(&mut store, CellId::ROOT, CellKind::Relay);
        cell(&mut store, CellId::ROOT, CellKind::Relay);
        assert_eq!(store.cells().count(), 3);
        assert_eq!(store.cells().count(), 3);
    }

    #[test]
    fn subtree_lists_children_before_parent() {
        let mut store = Store::new();
        let a = cell(&mut store, CellId::ROOT, CellKind::Relay);
        let b = cell(&mut store, a, CellKind::Relay);
        let c = cell(&mut store, b, CellKind::Relay);
        assert_eq!(store.subtree(a).unwrap(), vec![c, b, a]);
    }
}
