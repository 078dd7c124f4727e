//! Operations: descriptions of store mutations produced by peaks.
//!
//! Computing a peak never touches the store. Whatever a peak wants changed
//! is written down here and applied later by [`crate::apply`], which is what
//! lets the evaluator run against projected stores.

use crate::cell::{CellPatch, CellTag};
use crate::id::{CellId, Id, WireId};
use crate::wire::WirePatch;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Modify { id: CellId, fields: CellPatch },
    ModifyWire { id: WireId, fields: WirePatch },
    Tag { id: CellId, key: CellTag },
    /// Answer to a ping. No store effect, forwarded to the UI.
    Pong { id: CellId },
}

impl Operation {
    pub fn target(&self) -> Id {
        match self {
            Operation::Modify { id, .. } | Operation::Tag { id, .. } | Operation::Pong { id } => {
                (*id).into()
            }
            Operation::ModifyWire { id, .. } => (*id).into(),
        }
    }

    /// True if this operation rewrites `cell`.
    pub fn claims(&self, cell: CellId) -> bool {
        matches!(self, Operation::Modify { id, .. } if *id == cell)
    }
}

/// Most peaks carry zero to two operations.
pub type Operations = SmallVec<[Operation; 2]>;

/// Append `operation` unless an equal one is already present.
pub fn push_unique(operations: &mut Operations, operation: Operation) {
    if !operations.contains(&operation) {
        operations.push(operation);
    }
}
