//! Behavior table: how each pulse kind folds into a cell's accumulated peak.
//!
//! A behavior receives the peak accumulated so far (`previous`), the peak
//! arriving over one input wire (`next`) and the hop it travelled. It returns
//! the new accumulated peak. Behaviors only read cells; any change they want
//! is written down as an [`Operation`].

use crate::cell::{Cell, CellKind, CellPatch, CellTag, CellTemplate};
use crate::error::Result;
use crate::operation::{Operation, Operations};
use crate::peak::{merge_operations, Peak};
use crate::pulse::{Pulse, PulseKind};
use crate::wire::Wire;
use log::trace;
use smallvec::smallvec;

/// The wire a candidate arrived over, with both of its cells.
#[derive(Clone, Copy, Debug)]
pub struct Hop<'a> {
    pub source: &'a Cell,
    pub target: &'a Cell,
    pub wire: &'a Wire,
}

pub type Behavior = fn(Peak, Peak, &Hop<'_>) -> Result<Peak>;

pub fn behavior(kind: PulseKind) -> Behavior {
    match kind {
        PulseKind::Raw => raw,
        PulseKind::Creation => creation,
        PulseKind::Destruction => destruction,
        PulseKind::Ping => ping,
    }
}

/// Fold `next` into `previous`.
///
/// Failed and halted candidates carry nothing across the hop.
pub fn fold(previous: Peak, next: Peak, hop: &Hop<'_>) -> Result<Peak> {
    let kind = match &next {
        Peak::Success {
            pulse,
            halted: false,
            ..
        } => pulse.kind(),
        _ => return Ok(previous),
    };
    trace!(
        "fold {kind} {} -> {} ({})",
        hop.source.id, hop.target.id, hop.target.kind
    );
    behavior(kind)(previous, next, hop)
}

/// Replace the pulse of a successful peak, keeping its operations.
fn retyped(next: Peak, pulse: Pulse) -> Peak {
    Peak::new(Some(pulse), next.into_operations())
}

fn raw(previous: Peak, next: Peak, hop: &Hop<'_>) -> Result<Peak> {
    match hop.source.kind {
        CellKind::Creation => creation(previous, retyped(next, Pulse::creation(None)), hop),
        CellKind::Destruction => destruction(previous, retyped(next, Pulse::Destruction), hop),
        _ => {
            let operations = merge_operations(&previous, next.into_operations());
            Ok(Peak::new(Some(Pulse::Raw), operations))
        }
    }
}

fn ping(previous: Peak, next: Peak, hop: &Hop<'_>) -> Result<Peak> {
    if hop.target.kind == CellKind::Stopper {
        return Ok(previous);
    }
    let mut operations = merge_operations(&previous, next.into_operations());
    operations.push(Operation::Pong { id: hop.target.id });
    Ok(Peak::new(Some(Pulse::Ping), operations))
}

fn creation(previous: Peak, next: Peak, hop: &Hop<'_>) -> Result<Peak> {
    let target = hop.target;
    if target.has_tag(CellTag::JustCreated) || previous.claims(target.id) {
        return Ok(previous);
    }
    let template = next.pulse().and_then(Pulse::template);

    if target.kind == CellKind::Slot {
        let template = template.unwrap_or_else(|| CellTemplate::fallback(target.position));
        let landed: Operations = smallvec![
            Operation::Modify {
                id: target.id,
                fields: CellPatch::from(template),
            },
            Operation::Tag {
                id: target.id,
                key: CellTag::JustCreated,
            },
        ];
        let mut operations = merge_operations(&previous, next.into_operations());
        operations.extend(landed);
        return Ok(Peak::halted(Pulse::creation(Some(template)), operations));
    }

    let template = if target.kind.is_cloneable() {
        Some(CellTemplate::of(target))
    } else {
        template
    };
    let operations = merge_operations(&previous, next.into_operations());
    Ok(Peak::new(Some(Pulse::creation(template)), operations))
}

fn destruction(previous: Peak, next: Peak, hop: &Hop<'_>) -> Result<Peak> {
    let target = hop.target;
    if previous.claims(target.id) {
        return Ok(previous);
    }
    let mut operations = merge_operations(&previous, next.into_operations());
    if target.kind.is_destroyable() {
        operations.push(Operation::Modify {
            id: target.id,
            fields: CellPatch::kind(CellKind::Slot),
        });
        return Ok(Peak::halted(Pulse::Destruction, operations));
    }
    Ok(Peak::new(Some(Pulse::Destruction), operations))
}
