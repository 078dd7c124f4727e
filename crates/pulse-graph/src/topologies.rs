//! Small graphs built programmatically, shared by tests and benchmarks.

use crate::cell::{CellKind, Vector2};
use crate::channel::{Timing, WireColour};
use crate::context::Context;
use crate::error::Result;
use crate::id::CellId;
use crate::store::Store;

/// Cells of `kinds` under the root, wired one after another at `Now`.
///
/// ```text
/// k0 -> k1 -> k2 -> ...
/// ```
pub fn chain(ctx: &Context, kinds: &[CellKind]) -> Result<(Store, Vec<CellId>)> {
    let mut store = Store::new();
    let mut cells = Vec::with_capacity(kinds.len());
    for (i, &kind) in kinds.iter().enumerate() {
        let cell = store.create_cell(ctx, CellId::ROOT, kind, Vector2::new(i as f64, 0.0))?;
        if let Some(&previous) = cells.last() {
            store.create_wire(ctx, previous, cell, WireColour::Any, Timing::Now)?;
        }
        cells.push(cell);
    }
    Ok((store, cells))
}

/// Two relays wired to each other with `Future` timing in both directions.
pub fn feedback_pair(ctx: &Context) -> Result<(Store, CellId, CellId)> {
    let mut store = Store::new();
    let a = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::new(0.0, 0.0))?;
    let b = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::new(1.0, 0.0))?;
    store.create_wire(ctx, a, b, WireColour::Any, Timing::Future)?;
    store.create_wire(ctx, b, a, WireColour::Any, Timing::Future)?;
    Ok((store, a, b))
}

/// Two relays in a `Now` cycle plus a feeder wired into the first.
///
/// ```text
/// feeder -> a <-> b
/// ```
///
/// Returns `[a, b, feeder]`.
pub fn fed_cycle(ctx: &Context) -> Result<(Store, [CellId; 3])> {
    let mut store = Store::new();
    let a = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::new(1.0, 0.0))?;
    let b = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::new(2.0, 0.0))?;
    let feeder = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::default())?;
    for (from, to) in [(a, b), (b, a), (feeder, a)] {
        store.create_wire(ctx, from, to, WireColour::Any, Timing::Now)?;
    }
    Ok((store, [a, b, feeder]))
}

/// A ring of `len` relays where every wire carries `timing`.
pub fn ring(ctx: &Context, len: usize, timing: Timing) -> Result<(Store, Vec<CellId>)> {
    let mut store = Store::new();
    let mut cells = Vec::with_capacity(len);
    for i in 0..len {
        let position = Vector2::new(i as f64, 0.0);
        cells.push(store.create_cell(ctx, CellId::ROOT, CellKind::Relay, position)?);
    }
    for i in 0..len {
        let next = cells[(i + 1) % len];
        store.create_wire(ctx, cells[i], next, WireColour::Any, timing)?;
    }
    Ok((store, cells))
}

/// `depth` layers of `width` relays. Every cell feeds every cell of the
/// next layer. The source feeds the first layer and the last layer feeds
/// the sink, so the sink has `width.pow(depth)` paths back to the source.
pub fn fan_in_lattice(
    ctx: &Context,
    width: usize,
    depth: usize,
) -> Result<(Store, CellId, CellId)> {
    let mut store = Store::new();
    let source = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::default())?;
    let mut layer = vec![source];
    for d in 0..depth {
        let mut next = Vec::with_capacity(width);
        for w in 0..width {
            let position = Vector2::new((d + 1) as f64, w as f64);
            next.push(store.create_cell(ctx, CellId::ROOT, CellKind::Relay, position)?);
        }
        for &from in &layer {
            for &to in &next {
                store.create_wire(ctx, from, to, WireColour::Any, Timing::Now)?;
            }
        }
        layer = next;
    }
    let sink = store.create_cell(
        ctx,
        CellId::ROOT,
        CellKind::Recording,
        Vector2::new((depth + 1) as f64, 0.0),
    )?;
    for &from in &layer {
        store.create_wire(ctx, from, sink, WireColour::Any, Timing::Now)?;
    }
    Ok((store, source, sink))
}

/// A group cell holding `len` children, each wired to the next at `Now`.
pub fn nested_group(ctx: &Context, len: usize) -> Result<(Store, CellId, Vec<CellId>)> {
    let mut store = Store::new();
    let group = store.create_cell(ctx, CellId::ROOT, CellKind::Relay, Vector2::default())?;
    let mut children: Vec<CellId> = Vec::with_capacity(len);
    for i in 0..len {
        let child = store.create_cell(ctx, group, CellKind::Relay, Vector2::new(i as f64, 1.0))?;
        if let Some(&previous) = children.last() {
            store.create_wire(ctx, previous, child, WireColour::Any, Timing::Now)?;
        }
        children.push(child);
    }
    Ok((store, group, children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::check_all;

    const CTX: Context = Context::debug();

    #[test]
    fn fixtures_are_consistent() {
        let (store, cells) = chain(&CTX, &[CellKind::Creation, CellKind::Slot]).unwrap();
        assert_eq!(cells.len(), 2);
        check_all(&store).unwrap();

        let (store, _, _) = feedback_pair(&CTX).unwrap();
        assert_eq!(store.wires().count(), 2);

        let (store, _) = fed_cycle(&CTX).unwrap();
        assert_eq!(store.wires().count(), 3);
        check_all(&store).unwrap();

        let (store, _) = ring(&CTX, 4, Timing::Past).unwrap();
        assert_eq!(store.wires().count(), 4);

        let (store, _, _) = fan_in_lattice(&CTX, 3, 2).unwrap();
        assert_eq!(store.wires().count(), 3 + 9 + 3);
        check_all(&store).unwrap();

        let (store, group, children) = nested_group(&CTX, 3).unwrap();
        assert_eq!(store.cell(group).unwrap().children, children);
    }
}
