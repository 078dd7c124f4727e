//! Pulse graph: a time-aware dataflow engine.
//!
//! Cells hold pulses in three colours and pass them along coloured, timed
//! wires. Asking whether a cell fires yields a [`Peak`]: the pulse that
//! reaches it plus the [`Operation`]s that pulse wants applied. Wires timed
//! into the past or future are answered against concrete snapshots or
//! against projections of the store one logical tick away.

pub mod apply;
pub mod beat;
pub mod behavior;
pub mod cell;
pub mod channel;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod id;
pub mod ledger;
pub mod operation;
pub mod peak;
pub mod pulse;
pub mod store;
pub mod timeline;
pub mod topologies;
pub mod validate;
pub mod wire;

pub use apply::{apply_operations, Applied};
pub use beat::{ChangeLog, Pulsar};
pub use cell::{Cell, CellKind, CellPatch, CellTag, CellTemplate, Vector2};
pub use channel::{Colour, Timing, WireColour};
pub use context::Context;
pub use error::{PulseError, Result};
pub use evaluator::{get_peak, is_firing, EvalStats, Evaluator};
pub use id::{CellId, Id, WireId};
pub use operation::Operation;
pub use peak::Peak;
pub use pulse::{Pulse, PulseKind};
pub use store::{Entity, Store};
pub use wire::{Wire, WirePatch};
