//! Movement resolution.
//!
//! A move is resolved in two clipping passes:
//!
//! 1. **Walls**, one axis at a time (x then y).  Each axis walks every tile
//!    boundary it crosses, and crossing into a tile that is a wall, off the
//!    map, or behind a blocked edge is cut short so the agent's body stops
//!    `radius` from the edge.  The other axis keeps its motion, so agents
//!    slide along walls.
//! 2. **Agents**, along the heading left after pass 1.  The travel is cut
//!    to the first point of contact with any neighbour ahead on the ray.
//!    Agents never push each other and never move backwards.

use crowd_agent::PositionStore;
use crowd_core::{AgentId, Parity, Vec2};
use crowd_grid::{Grid, Side};

use crate::{MotionConfig, MotionError, MotionResult, occupancy};

/// The outcome of one resolved move.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Movement {
    pub from:         Vec2,
    pub to:           Vec2,
    /// Distance actually covered; 0 when the agent stayed put.
    pub distance:     f64,
    /// The agent's tile changed.
    pub changed_tile: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MovementResolver {
    pub config: MotionConfig,
}

impl MovementResolver {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Where `agent` at `from` ends up after trying to travel `step` along
    /// `heading`.  Neighbours are read at their latest positions, so agents
    /// moved earlier in the same tick are seen where they now stand.
    ///
    /// Fails if `from` or the resolved endpoint lies outside the grid.
    pub fn resolve(
        &self,
        grid:      &Grid,
        positions: &PositionStore,
        agent:     AgentId,
        from:      Vec2,
        heading:   f64,
        step:      f64,
    ) -> MotionResult<Vec2> {
        let (tx, ty) = from.tile();
        grid.index(tx, ty)?;

        if step <= 0.0 || !step.is_finite() || !heading.is_finite() {
            return Ok(from);
        }

        let wanted = from.step(heading, step);
        let clipped = self.clip_walls(grid, from, wanted);
        let delta = clipped - from;
        let length = delta.dot(delta).sqrt();
        if length <= 0.0 {
            return Ok(from);
        }
        let dir = Vec2::new(delta.x / length, delta.y / length);

        let travel = self.clip_agents(grid, positions, agent, from, dir, length)?;
        if travel <= 0.0 {
            return Ok(from);
        }
        let to = Vec2::new(from.x + dir.x * travel, from.y + dir.y * travel);
        if travel < length && self.clip_walls(grid, from, to).tile() != to.tile() {
            // Cut short on the straight line into a tile the x-then-y walk
            // never entered.
            return Ok(from);
        }

        let (ex, ey) = to.tile();
        if !grid.in_bounds(ex, ey) {
            return Err(MotionError::Escaped { agent, to });
        }
        Ok(to)
    }

    /// Resolve and commit one agent's move for this tick.
    ///
    /// Always writes the agent's position (a standing agent has its
    /// committed position carried forward) and keeps tile occupancy in step
    /// with the new position.
    pub fn apply(
        &self,
        grid:      &mut Grid,
        positions: &mut PositionStore,
        agent:     AgentId,
        parity:    Parity,
        heading:   Option<f64>,
        step:      f64,
    ) -> MotionResult<Movement> {
        let from = positions.committed(agent, parity)?;
        let to = match heading {
            Some(theta) => self.resolve(grid, positions, agent, from, theta, step)?,
            None => from,
        };
        positions.write(agent, parity, to)?;
        let changed_tile = occupancy::relocate(grid, agent, from, to)?;
        Ok(Movement { from, to, distance: from.distance(to), changed_tile })
    }

    // ── Wall pass ─────────────────────────────────────────────────────────

    fn clip_walls(&self, grid: &Grid, from: Vec2, wanted: Vec2) -> Vec2 {
        let r = self.config.radius;
        let (tx, ty) = from.tile();

        let x = clip_axis(from.x, wanted.x, tx, r, |col, side| grid.can_leave(col, ty, side), Side::East, Side::West);
        // The y walk starts from whichever column the x walk ended in.
        let col = x.floor() as i64;
        let y = clip_axis(from.y, wanted.y, ty, r, |row, side| grid.can_leave(col, row, side), Side::South, Side::North);
        Vec2::new(x, y)
    }

    // ── Agent pass ────────────────────────────────────────────────────────

    /// Longest travel in `[0, length]` along unit `dir` that keeps `agent`
    /// at least two radii from every neighbour it is approaching.
    fn clip_agents(
        &self,
        grid:      &Grid,
        positions: &PositionStore,
        agent:     AgentId,
        from:      Vec2,
        dir:       Vec2,
        length:    f64,
    ) -> MotionResult<f64> {
        let contact = 2.0 * self.config.radius;
        let contact_sq = contact * contact;
        let reach = (length + contact).ceil() as i64;
        let (tx, ty) = from.tile();

        let mut allowed = length;
        for other in occupancy::neighbours(grid, tx, ty, reach) {
            if other == agent {
                continue;
            }
            let rel = positions.latest(other)? - from;
            let dist_sq = rel.dot(rel);
            let ahead = rel.dot(dir);
            if ahead <= 0.0 {
                // Behind or level: moving can only increase separation.
                continue;
            }
            if dist_sq < contact_sq {
                log::debug!("{agent} overlaps {other} and is closing in; holding still");
                return Ok(0.0);
            }
            let perp_sq = dist_sq - ahead * ahead;
            if perp_sq >= contact_sq {
                continue;
            }
            let first_contact = ahead - (contact_sq - perp_sq).sqrt();
            allowed = allowed.min(first_contact.max(0.0));
        }
        Ok(allowed)
    }
}

/// Clip motion from `from` to `wanted` along one axis, starting in tile
/// `tile` and stepping tile by tile until the body fits or a side is shut.
/// `open(tile, side)` says whether `tile` may be left through `side`;
/// `positive` / `negative` are the sides crossed moving up / down the axis.
fn clip_axis(
    from:     f64,
    wanted:   f64,
    tile:     i64,
    radius:   f64,
    open:     impl Fn(i64, Side) -> bool,
    positive: Side,
    negative: Side,
) -> f64 {
    let mut t = tile;
    if wanted > from {
        while wanted + radius > (t + 1) as f64 {
            if !open(t, positive) {
                return ((t + 1) as f64 - radius).clamp(from, wanted);
            }
            t += 1;
        }
    } else if wanted < from {
        while wanted - radius < t as f64 {
            if !open(t, negative) {
                return (t as f64 + radius).clamp(wanted, from);
            }
            t -= 1;
        }
    }
    wanted
}
