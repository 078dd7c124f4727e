//! Schema assertions run after mutations when [`crate::Context::validate`] is set.

use crate::error::{PulseError, Result};
use crate::id::{CellId, Id};
use crate::store::{Entity, Store};
use log::warn;

/// Check one live row against the invariants linking it to its neighbours.
pub fn check(store: &Store, id: Id) -> Result<()> {
    let failure = match store.get(id)? {
        Entity::Cell(cell) => check_cell(store, cell),
        Entity::Wire(wire) => check_wire(store, wire),
    };
    match failure {
        None => Ok(()),
        Some(reason) => {
            warn!("validation failed for {id}: {reason}");
            Err(PulseError::ValidationFailed { id, reason })
        }
    }
}

/// Check every live row.
pub fn check_all(store: &Store) -> Result<()> {
    let ids: Vec<Id> = store
        .cells()
        .map(|cell| Id::from(cell.id))
        .chain(store.wires().map(|wire| Id::from(wire.id)))
        .collect();
    ids.into_iter().try_for_each(|id| check(store, id))
}

fn check_cell(store: &Store, cell: &crate::cell::Cell) -> Option<String> {
    match cell.parent {
        None if !cell.id.is_root() => return Some("only the root may lack a parent".into()),
        Some(_) if cell.id.is_root() => return Some("the root has a parent".into()),
        Some(parent) => match store.cell(parent) {
            Err(_) => return Some(format!("parent {parent} is missing")),
            Ok(parent_cell) if !parent_cell.children.contains(&cell.id) => {
                return Some(format!("parent {parent} does not list it as a child"));
            }
            Ok(_) => {}
        },
        None => {}
    }

    for &child in &cell.children {
        match store.cell(child) {
            Err(_) => return Some(format!("child {child} is missing")),
            Ok(child_cell) if child_cell.parent != Some(cell.id) => {
                return Some(format!("child {child} points at another parent"));
            }
            Ok(_) => {}
        }
    }

    for &input in &cell.inputs {
        match store.wire(input) {
            Err(_) => return Some(format!("input {input} is missing")),
            Ok(wire) if wire.target != cell.id => {
                return Some(format!("input {input} ends at {}", wire.target));
            }
            Ok(_) => {}
        }
    }

    for &output in &cell.outputs {
        match store.wire(output) {
            Err(_) => return Some(format!("output {output} is missing")),
            Ok(wire) if wire.source != cell.id => {
                return Some(format!("output {output} starts at {}", wire.source));
            }
            Ok(_) => {}
        }
    }

    if reaches_root(store, cell.id).is_none() {
        return Some("parent chain does not reach the root".into());
    }
    None
}

fn check_wire(store: &Store, wire: &crate::wire::Wire) -> Option<String> {
    match store.cell(wire.source) {
        Err(_) => return Some(format!("source {} is missing", wire.source)),
        Ok(source) if !source.outputs.contains(&wire.id) => {
            return Some(format!("source {} does not list it as an output", wire.source));
        }
        Ok(_) => {}
    }
    match store.cell(wire.target) {
        Err(_) => Some(format!("target {} is missing", wire.target)),
        Ok(target) if !target.inputs.contains(&wire.id) => {
            Some(format!("target {} does not list it as an input", wire.target))
        }
        Ok(_) => None,
    }
}

/// Number of steps from `id` up to the root, or `None` on a loop or a gap.
fn reaches_root(store: &Store, id: CellId) -> Option<usize> {
    let mut current = id;
    for steps in 0..=store.len() {
        if current.is_root() {
            return Some(steps);
        }
        current = store.cell(current).ok()?.parent?;
    }
    None
}
