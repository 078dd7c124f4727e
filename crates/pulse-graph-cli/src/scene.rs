//! Scene files: a named graph plus the pulses to fire before the first beat.
//!
//! ```toml
//! [[cell]]
//! name = "spawner"
//! kind = "creation"
//!
//! [[cell]]
//! name = "hole"
//! kind = "slot"
//! x = 1.0
//!
//! [[wire]]
//! source = "spawner"
//! target = "hole"
//! colour = "red"      # any (default), red, green, blue
//! timing = "now"      # past, now (default), future
//!
//! [[fire]]
//! cell = "spawner"
//! colour = "red"
//! ```

use anyhow::{bail, Context as _, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use pulse_graph::{
    CellId, CellKind, Colour, Context, Pulse, PulseKind, Store, Timing, Vector2, WireColour,
};
use serde::Deserialize;
use std::path::Path;

/// Name the root cell answers to in `parent` fields.
pub const ROOT_NAME: &str = "root";

/// Scene names in declaration order.
pub type Names = IndexMap<String, CellId>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default, rename = "cell")]
    pub cells: Vec<CellSpec>,
    #[serde(default, rename = "wire")]
    pub wires: Vec<WireSpec>,
    #[serde(default, rename = "fire")]
    pub fires: Vec<FireSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellSpec {
    pub name: String,
    #[serde(default)]
    pub kind: CellKind,
    /// Must name a cell declared earlier. Defaults to the root.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireSpec {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub colour: WireColour,
    #[serde(default)]
    pub timing: TimingName,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FireSpec {
    pub cell: String,
    pub colour: Colour,
    #[serde(default = "raw_pulse")]
    pub pulse: PulseKind,
}

fn raw_pulse() -> PulseKind {
    PulseKind::Raw
}

/// Timing spelled out, for scene files and the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimingName {
    Past,
    #[default]
    Now,
    Future,
}

impl From<TimingName> for Timing {
    fn from(name: TimingName) -> Self {
        match name {
            TimingName::Past => Timing::Past,
            TimingName::Now => Timing::Now,
            TimingName::Future => Timing::Future,
        }
    }
}

/// A scene turned into a store.
pub struct Built {
    pub store: Store,
    pub names: Names,
}

impl Built {
    /// Resolve a cell by scene name, or by raw id for stores loaded from JSON.
    pub fn resolve(&self, cell: &str) -> Result<CellId> {
        if let Some(&id) = self.names.get(cell) {
            return Ok(id);
        }
        cell.parse::<i32>()
            .ok()
            .and_then(CellId::from_raw)
            .filter(|&id| self.store.cell(id).is_ok())
            .with_context(|| format!("unknown cell `{cell}`"))
    }
}

impl Scene {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid scene TOML")
    }

    /// Create every cell and wire, then store the initial pulses.
    pub fn build(&self, ctx: &Context) -> Result<Built> {
        let mut store = Store::new();
        let mut names = Names::new();
        names.insert(ROOT_NAME.to_string(), CellId::ROOT);

        for cell in &self.cells {
            if names.contains_key(&cell.name) {
                bail!("cell `{}` is declared twice", cell.name);
            }
            let parent = match &cell.parent {
                Some(parent) => *names
                    .get(parent)
                    .with_context(|| format!("cell `{}`: unknown parent `{parent}`", cell.name))?,
                None => CellId::ROOT,
            };
            let id = store
                .create_cell(ctx, parent, cell.kind, Vector2::new(cell.x, cell.y))
                .with_context(|| format!("creating cell `{}`", cell.name))?;
            names.insert(cell.name.clone(), id);
        }

        for wire in &self.wires {
            let source = *names
                .get(&wire.source)
                .with_context(|| format!("wire: unknown source `{}`", wire.source))?;
            let target = *names
                .get(&wire.target)
                .with_context(|| format!("wire: unknown target `{}`", wire.target))?;
            store
                .create_wire(ctx, source, target, wire.colour, wire.timing.into())
                .with_context(|| format!("wiring `{}` -> `{}`", wire.source, wire.target))?;
        }

        for fire in &self.fires {
            let cell = *names
                .get(&fire.cell)
                .with_context(|| format!("fire: unknown cell `{}`", fire.cell))?;
            store
                .fire(ctx, cell, fire.colour, Pulse::new(fire.pulse))
                .with_context(|| format!("firing `{}`", fire.cell))?;
        }

        log::debug!(
            "scene built: {} cells, {} wires, {} fired",
            self.cells.len(),
            self.wires.len(),
            self.fires.len()
        );
        Ok(Built { store, names })
    }
}

/// Load a TOML scene, or a store previously dumped as JSON.
pub fn load(path: &Path, ctx: &Context) -> Result<Built> {
    if path.extension().is_some_and(|ext| ext == "json") {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let store = Store::from_json(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let mut names = Names::new();
        names.insert(ROOT_NAME.to_string(), CellId::ROOT);
        return Ok(Built { store, names });
    }
    Scene::from_file(path)?.build(ctx)
}
