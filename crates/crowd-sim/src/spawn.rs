//! Finding collision-free spawn points at the entrances.

use std::f64::consts::TAU;

use crowd_agent::PositionStore;
use crowd_core::{Circle, SimRng, Vec2};
use crowd_grid::Grid;
use crowd_motion::occupancy;

/// Attempts per spawn before giving up until the next tick.
pub const SPAWN_ATTEMPTS: usize = 100;

/// Pick a random point in a random entrance that is on a walkable tile and
/// at least `2 · radius` from every agent.  Returns `None` when no such
/// point turned up within `attempts` draws.
pub fn try_spawn(
    grid:      &Grid,
    positions: &PositionStore,
    entrances: &[Circle],
    radius:    f64,
    attempts:  usize,
    rng:       &mut SimRng,
) -> Option<Vec2> {
    if entrances.is_empty() {
        return None;
    }
    let clearance_sq = (2.0 * radius) * (2.0 * radius);
    let reach = (2.0 * radius).ceil() as i64;

    for _ in 0..attempts {
        let entrance = entrances[rng.gen_range(0..entrances.len())];
        let angle = rng.unit() * TAU;
        let dist = rng.unit() * entrance.radius;
        let p = entrance.center.step(angle, dist);

        let (tx, ty) = p.tile();
        if !grid.is_open(tx, ty) {
            continue;
        }
        let crowded = occupancy::neighbours(grid, tx, ty, reach).any(|other| {
            positions
                .latest(other)
                .is_ok_and(|q| q.distance_sq(p) < clearance_sq)
        });
        if !crowded {
            return Some(p);
        }
    }
    log::debug!("no free spawn point after {attempts} attempts");
    None
}
