//! Applying operations to the live store.

use crate::context::Context;
use crate::error::Result;
use crate::id::CellId;
use crate::operation::Operation;
use crate::store::Store;
use log::debug;
use serde::Serialize;

/// What [`apply_operations`] did.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Applied {
    /// Operations with a store effect, in application order.
    pub operations: Vec<Operation>,
    /// Cells that answered a ping, for the UI.
    pub pongs: Vec<CellId>,
}

impl Applied {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.pongs.is_empty()
    }
}

/// Apply `operations` in order. Stops at the first failing operation;
/// the ones before it stay applied.
pub fn apply_operations(
    ctx: &Context,
    store: &mut Store,
    operations: &[Operation],
) -> Result<Applied> {
    let mut applied = Applied::default();
    for operation in operations {
        match operation {
            Operation::Modify { id, fields } => store.modify_cell(ctx, *id, *fields)?,
            Operation::ModifyWire { id, fields } => store.modify_wire(ctx, *id, *fields)?,
            Operation::Tag { id, key } => store.tag(ctx, *id, *key)?,
            Operation::Pong { id } => {
                applied.pongs.push(*id);
                continue;
            }
        }
        debug!("applied {operation:?}");
        applied.operations.push(operation.clone());
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellKind, CellPatch, CellTag, Vector2};
    use crate::channel::{Timing, WireColour};
    use crate::error::PulseError;
    use crate::wire::WirePatch;

    const CTX: Context = Context::debug();

    #[test]
    fn empty_list_is_a_no_op() {
        let mut store = Store::new();
        let before = store.clone();
        let applied = apply_operations(&CTX, &mut store, &[]).unwrap();
        assert!(applied.is_empty());
        assert!(store.same_state(&before));
    }

    #[test]
    fn modify_tag_and_pong() {
        let mut store = Store::new();
        let slot = store
            .create_cell(&CTX, CellId::ROOT, CellKind::Slot, Vector2::default())
            .unwrap();
        let wire = store
            .create_wire(&CTX, slot, slot, WireColour::Any, Timing::Now)
            .unwrap();

        let operations = [
            Operation::Modify {
                id: slot,
                fields: CellPatch::kind(CellKind::Recording),
            },
            Operation::ModifyWire {
                id: wire,
                fields: WirePatch::timing(Timing::Future),
            },
            Operation::Tag {
                id: slot,
                key: CellTag::JustCreated,
            },
            Operation::Pong { id: slot },
        ];
        let applied = apply_operations(&CTX, &mut store, &operations).unwrap();

        assert_eq!(applied.operations.len(), 3);
        assert_eq!(applied.pongs, vec![slot]);
        let cell = store.cell(slot).unwrap();
        assert_eq!(cell.kind, CellKind::Recording);
        assert!(cell.has_tag(CellTag::JustCreated));
        assert_eq!(store.wire(wire).unwrap().timing, Timing::Future);
    }

    #[test]
    fn missing_target_is_reported() {
        let mut store = Store::new();
        let ghost = CellId::from_raw(3).unwrap();
        let result = apply_operations(
            &CTX,
            &mut store,
            &[Operation::Tag {
                id: ghost,
                key: CellTag::JustCreated,
            }],
        );
        assert_eq!(result, Err(PulseError::NotFound(ghost.into())));
    }
}
