mod scene;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pulse_graph::validate::check_all;
use pulse_graph::{Colour, Context, Evaluator, Pulsar};
use scene::TimingName;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pulse-graph")]
#[command(about = "Run pulse graph scenes")]
struct Cli {
    /// Validate the store after every mutation
    #[arg(long, global = true)]
    validate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scene, fire its pulses and run beats, printing each change-log
    Run {
        /// Path to a .toml scene or a .json store dump
        scene: PathBuf,
        /// Number of beats to run
        #[arg(long, default_value_t = 1)]
        beats: u64,
        /// Past stores kept for timed queries
        #[arg(long)]
        history: Option<usize>,
    },
    /// Print the peak of one cell
    Peak {
        scene: PathBuf,
        /// Scene name or numeric id
        cell: String,
        #[arg(long, value_enum, default_value_t = ColourName::Red)]
        colour: ColourName,
        #[arg(long, value_enum, default_value_t = TimingName::Now)]
        timing: TimingName,
    },
    /// Load a scene and check the store's invariants
    Check { scene: PathBuf },
    /// Print the built store as JSON
    Dump { scene: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColourName {
    Red,
    Green,
    Blue,
}

impl From<ColourName> for Colour {
    fn from(name: ColourName) -> Self {
        match name {
            ColourName::Red => Colour::Red,
            ColourName::Green => Colour::Green,
            ColourName::Blue => Colour::Blue,
        }
    }
}

#[derive(Serialize)]
struct PeakReport<'a> {
    cell: &'a str,
    colour: Colour,
    peak: pulse_graph::Peak,
    stats: pulse_graph::EvalStats,
}

#[derive(Serialize)]
struct CheckReport {
    cells: usize,
    wires: usize,
    firing: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let ctx = Context::release().with_validation(cli.validate);

    match cli.command {
        Commands::Run {
            scene,
            beats,
            history,
        } => {
            let built = scene::load(&scene, &ctx)?;
            log::info!("running {} for {beats} beats", scene.display());
            let mut pulsar = Pulsar::with_store(ctx, built.store);
            if let Some(limit) = history {
                pulsar.set_history_limit(limit);
            }
            for _ in 0..beats {
                let change = pulsar.beat()?;
                println!("{}", change.to_json()?);
            }
        }

        Commands::Peak {
            scene,
            cell,
            colour,
            timing,
        } => {
            let built = scene::load(&scene, &ctx)?;
            let id = built.resolve(&cell)?;
            let colour = Colour::from(colour);
            let mut evaluator = Evaluator::new(&ctx, &built.store);
            let peak = evaluator
                .peak(id, colour, timing.into())
                .with_context(|| format!("peak of `{cell}`"))?;
            let report = PeakReport {
                cell: &cell,
                colour,
                peak,
                stats: evaluator.stats(),
            };
            println!("{}", serde_json::to_string(&report)?);
        }

        Commands::Check { scene } => {
            let built = scene::load(&scene, &ctx)?;
            check_all(&built.store)
                .with_context(|| format!("{} is inconsistent", scene.display()))?;
            let mut evaluator = Evaluator::new(&ctx, &built.store);
            let mut firing = 0;
            for cell in built.store.cells() {
                if evaluator.is_firing(cell.id)? {
                    firing += 1;
                }
            }
            let report = CheckReport {
                cells: built.store.cells().count(),
                wires: built.store.wires().count(),
                firing,
            };
            println!("{}", serde_json::to_string(&report)?);
        }

        Commands::Dump { scene } => {
            let built = scene::load(&scene, &ctx)?;
            println!("{}", built.store.to_json()?);
        }
    }

    Ok(())
}
