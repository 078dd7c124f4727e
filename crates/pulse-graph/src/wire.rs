//! Wires: directed, coloured, timed edges between cells.

use crate::channel::{Timing, WireColour};
use crate::id::{CellId, WireId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub source: CellId,
    pub target: CellId,
    pub colour: WireColour,
    pub timing: Timing,
}

impl Wire {
    /// True if the wire touches `cell` at either end.
    pub fn touches(&self, cell: CellId) -> bool {
        self.source == cell || self.target == cell
    }
}

/// Partial update for a wire. Moving an end re-links both cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CellId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CellId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<WireColour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
}

impl WirePatch {
    pub fn colour(colour: WireColour) -> Self {
        Self {
            colour: Some(colour),
            ..Self::default()
        }
    }

    pub fn timing(timing: Timing) -> Self {
        Self {
            timing: Some(timing),
            ..Self::default()
        }
    }
}
