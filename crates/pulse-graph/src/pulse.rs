//! Pulses: the signal values a cell can hold.

use crate::cell::CellTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`Pulse`], used to key the behavior table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseKind {
    Raw,
    Creation,
    Destruction,
    Ping,
}

impl fmt::Display for PulseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PulseKind::Raw => "raw",
            PulseKind::Creation => "creation",
            PulseKind::Destruction => "destruction",
            PulseKind::Ping => "ping",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pulse {
    /// Unclassified signal, what `fire_cell` stores.
    Raw,
    /// Fills the next slot it reaches with `template`.
    Creation { template: Option<CellTemplate> },
    /// Empties the next destroyable cell it reaches.
    Destruction,
    /// Diagnostic, answered by a `Pong` at every cell it crosses.
    Ping,
}

impl Pulse {
    /// A pulse of `kind` with an empty payload.
    pub fn new(kind: PulseKind) -> Self {
        match kind {
            PulseKind::Raw => Pulse::Raw,
            PulseKind::Creation => Pulse::Creation { template: None },
            PulseKind::Destruction => Pulse::Destruction,
            PulseKind::Ping => Pulse::Ping,
        }
    }

    pub fn creation(template: Option<CellTemplate>) -> Self {
        Pulse::Creation { template }
    }

    pub fn kind(&self) -> PulseKind {
        match self {
            Pulse::Raw => PulseKind::Raw,
            Pulse::Creation { .. } => PulseKind::Creation,
            Pulse::Destruction => PulseKind::Destruction,
            Pulse::Ping => PulseKind::Ping,
        }
    }

    pub fn template(&self) -> Option<CellTemplate> {
        match self {
            Pulse::Creation { template } => *template,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellKind, Vector2};

    #[test]
    fn new_round_trips_kind() {
        for kind in [
            PulseKind::Raw,
            PulseKind::Creation,
            PulseKind::Destruction,
            PulseKind::Ping,
        ] {
            assert_eq!(Pulse::new(kind).kind(), kind);
        }
        assert_eq!(Pulse::new(PulseKind::Creation).template(), None);
    }

    #[test]
    fn creation_keeps_its_template() {
        let template = CellTemplate {
            kind: CellKind::Destruction,
            position: Vector2::new(1.0, 2.0),
        };
        assert_eq!(Pulse::creation(Some(template)).template(), Some(template));
        assert_eq!(Pulse::Ping.template(), None);
    }
}
