use crate::id::{CellId, Id};
use thiserror::Error;

/// Everything the engine reports as a failure.
///
/// Feedback loops in the temporal evaluator are not errors: they end in an
/// ordinary `Fail` peak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PulseError {
    #[error("{0} does not exist")]
    NotFound(Id),

    #[error("{0} is not a {1}")]
    WrongKind(Id, &'static str),

    /// A propagation path that has not been designed yet.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// Debug-only schema check after a mutation.
    #[error("validation failed for {id}: {reason}")]
    ValidationFailed { id: Id, reason: String },

    #[error("the root cell cannot be removed or re-parented")]
    RootImmovable,

    #[error("{cell} cannot be moved under its own descendant {parent}")]
    CyclicParent { cell: CellId, parent: CellId },
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
