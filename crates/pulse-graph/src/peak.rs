//! Peaks: the answer to "is this cell firing?".

use crate::id::CellId;
use crate::operation::{push_unique, Operation, Operations};
use crate::pulse::{Pulse, PulseKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "peak", rename_all = "snake_case")]
pub enum Peak {
    Fail {
        operations: Operations,
    },
    Success {
        pulse: Pulse,
        operations: Operations,
        /// The pulse came to rest at this cell. The cell fires, but cells
        /// downstream never see this pulse.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        halted: bool,
    },
}

impl Peak {
    /// `Success` iff a pulse is supplied.
    pub fn new(pulse: Option<Pulse>, operations: Operations) -> Self {
        match pulse {
            Some(pulse) => Peak::Success {
                pulse,
                operations,
                halted: false,
            },
            None => Peak::Fail { operations },
        }
    }

    pub fn fail() -> Self {
        Peak::Fail {
            operations: Operations::new(),
        }
    }

    pub fn success(pulse: Pulse) -> Self {
        Self::new(Some(pulse), Operations::new())
    }

    pub fn halted(pulse: Pulse, operations: Operations) -> Self {
        Peak::Success {
            pulse,
            operations,
            halted: true,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Peak::Success { .. })
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Peak::Success { halted: true, .. })
    }

    /// Further inputs cannot change a final peak.
    pub fn is_final(&self) -> bool {
        match self {
            Peak::Success { pulse, halted, .. } => *halted || pulse.kind() != PulseKind::Raw,
            Peak::Fail { .. } => false,
        }
    }

    pub fn pulse(&self) -> Option<&Pulse> {
        match self {
            Peak::Success { pulse, .. } => Some(pulse),
            Peak::Fail { .. } => None,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        match self {
            Peak::Success { operations, .. } | Peak::Fail { operations } => operations,
        }
    }

    pub fn into_operations(self) -> Operations {
        match self {
            Peak::Success { operations, .. } | Peak::Fail { operations } => operations,
        }
    }

    /// True if one of the pending operations already rewrites `cell`.
    pub fn claims(&self, cell: CellId) -> bool {
        self.operations().iter().any(|op| op.claims(cell))
    }
}

/// Operations of `previous` followed by those of `next`, without duplicates.
pub(crate) fn merge_operations(previous: &Peak, next: Operations) -> Operations {
    let mut merged: Operations = previous.operations().iter().cloned().collect();
    for op in next {
        push_unique(&mut merged, op);
    }
    merged
}
