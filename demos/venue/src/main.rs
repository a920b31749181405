//! venue: drive the crowd engine over a synthetic or on-disk venue.
//!
//! ```text
//! venue                          # synthetic two-hall venue, CSV output
//! venue path/to/scenario.json    # on-disk scenario, CSV output
//! venue path/to/scenario.json void
//! ```
//!
//! CSV output lands in `output/<name>/`.  `void` discards transitions,
//! which is how the engine is load tested.

mod venue;

#[cfg(test)]
mod tests;

use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crowd_core::SimConfig;
use crowd_output::{CsvTransitionWriter, SimOutputObserver, TransitionSink, VoidSink};
use crowd_scenario::Scenario;
use crowd_sim::{Sim, SimBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const TICK_DURATION_SECS:    u32 = 1;
const SYNTHETIC_SECS:        u64 = 1_800;
const SYNTHETIC_PEOPLE:      u32 = 300;
const SYNTHETIC_GROUPS:      u32 = 8;
const OUTPUT_INTERVAL_TICKS: u64 = 60;

// ── Setup ─────────────────────────────────────────────────────────────────────

fn synthetic() -> Result<(String, Sim)> {
    let config = SimConfig {
        start_unix_secs:       1_700_000_000,
        tick_duration_secs:    TICK_DURATION_SECS,
        total_ticks:           SYNTHETIC_SECS,
        seed:                  SEED,
        num_threads:           None,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };
    let v = venue::build(config.start_unix_secs, SYNTHETIC_SECS as i64)?;
    let sim = SimBuilder::new(config, v.grid, v.destinations)
        .regions(v.regions)
        .entrances(v.entrances)
        .population(SYNTHETIC_PEOPLE, SYNTHETIC_GROUPS)
        .spawn_per_tick(2)
        .build()?;
    Ok(("synthetic".into(), sim))
}

fn from_file(path: &Path) -> Result<(String, Sim)> {
    let scenario = Scenario::load(path).with_context(|| format!("loading {}", path.display()))?;
    let mut config = scenario.sim_config(TICK_DURATION_SECS, SEED);
    config.output_interval_ticks = OUTPUT_INTERVAL_TICKS;
    let sim = SimBuilder::new(config, scenario.grid, scenario.destinations)
        .regions(scenario.regions)
        .entrances(scenario.entrances)
        .population(scenario.total_people, scenario.total_groups)
        .spawn_per_tick(scenario.spawn_per_tick)
        .build()?;
    Ok((scenario.name, sim))
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run<S: TransitionSink>(sim: &mut Sim, sink: S) -> Result<S> {
    let mut obs = SimOutputObserver::new(sink);

    // Close the bar for the second half of the run.
    let half = sim.config.total_ticks / 2;
    sim.run_ticks(half, &mut obs)?;
    let bar = sim.destinations.iter().find(|d| d.name == "bar").map(|d| d.id);
    if let Some(bar) = bar {
        sim.close_destination(bar)?;
    }
    sim.run(&mut obs)?;

    if let Some(e) = obs.take_error() {
        log::warn!("output error: {e}");
    }
    Ok(obs.into_sink())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let scenario = args.next().map(PathBuf::from);
    let void = args.next().as_deref() == Some("void");

    let (name, mut sim) = match &scenario {
        Some(path) => from_file(path)?,
        None => synthetic()?,
    };
    log::info!(
        "{name}: {}×{} grid, {} destinations, {} regions, {} ticks",
        sim.grid.width(),
        sim.grid.height(),
        sim.destinations.len(),
        sim.regions.len(),
        sim.config.total_ticks,
    );

    let t0 = Instant::now();
    sim.generate_flow_fields();

    if void {
        run(&mut sim, VoidSink)?;
    } else {
        let dir = Path::new("output").join(&name);
        std::fs::create_dir_all(&dir)?;
        run(&mut sim, CsvTransitionWriter::new(&dir)?)?;
        log::info!("wrote CSV output to {}", dir.display());
    }

    println!("Simulation complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!("  admitted  : {}", sim.admitted());
    println!("  remaining : {}", sim.agent_count());
    println!();

    println!("{:<10} {:>8}", "Tile hits", "count");
    println!("{}", "-".repeat(19));
    let mut busiest: Vec<(usize, u32)> = sim.grid.tiles().iter().map(|t| t.hits).enumerate().collect();
    busiest.sort_unstable_by_key(|&(_, hits)| std::cmp::Reverse(hits));
    for (i, hits) in busiest.into_iter().take(5) {
        let (x, y) = sim.grid.coords(i);
        println!("({x:>3},{y:>3}) {hits:>8}");
    }

    Ok(())
}
