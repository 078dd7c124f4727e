//! Quick timing of the evaluator on the shared topologies.

use pulse_graph::topologies::{fan_in_lattice, ring};
use pulse_graph::{Colour, Context, Evaluator, Timing};
use std::time::Instant;

fn main() {
    let ctx = Context::release();

    println!("=== Fan-in lattice (width 3) ===\n");
    for depth in [4, 8, 16, 32] {
        let (mut store, source, sink) = match fan_in_lattice(&ctx, 3, depth) {
            Ok(built) => built,
            Err(err) => {
                eprintln!("building lattice failed: {err}");
                std::process::exit(1);
            }
        };
        if let Err(err) = store.fire_cell(&ctx, source, Colour::Red) {
            eprintln!("firing failed: {err}");
            std::process::exit(1);
        }

        let start = Instant::now();
        let mut evaluator = Evaluator::new(&ctx, &store);
        let peak = evaluator.peak(sink, Colour::Red, Timing::Now);
        let elapsed = start.elapsed();
        let stats = evaluator.stats();

        println!("depth {depth:>2}: {elapsed:?}");
        println!(
            "  success: {}, computed: {}, memo hits: {}\n",
            peak.is_ok_and(|peak| peak.is_success()),
            stats.computed,
            stats.memo_hits
        );
    }

    println!("=== Future-timed ring ===\n");
    for len in [8, 64, 512] {
        let (mut store, cells) = match ring(&ctx, len, Timing::Future) {
            Ok(built) => built,
            Err(err) => {
                eprintln!("building ring failed: {err}");
                std::process::exit(1);
            }
        };
        if let Err(err) = store.fire_cell(&ctx, cells[0], Colour::Green) {
            eprintln!("firing failed: {err}");
            std::process::exit(1);
        }

        let start = Instant::now();
        let mut evaluator = Evaluator::new(&ctx, &store);
        let firing = cells
            .iter()
            .filter(|&&cell| evaluator.is_firing(cell).unwrap_or(false))
            .count();
        let elapsed = start.elapsed();
        let stats = evaluator.stats();

        println!("ring {len:>3}: {elapsed:?}");
        println!(
            "  firing: {firing}, projections: {}, fixed points: {}, deepest: {}\n",
            stats.projections, stats.fixed_points, stats.deepest
        );
    }
}
