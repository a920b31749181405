//! Tile occupant lists.
//!
//! An agent is listed in exactly the tile holding its latest position.
//! Entering a tile (including the first placement) bumps its hit count.

use crowd_core::{AgentId, Vec2};
use crowd_grid::Grid;

use crate::{MotionError, MotionResult};

/// List `agent` in the tile containing `p`.
pub fn place(grid: &mut Grid, agent: AgentId, p: Vec2) -> MotionResult<()> {
    let (x, y) = p.tile();
    let tile = grid.tile_mut(x, y)?;
    tile.occupants.push(agent);
    tile.hits = tile.hits.saturating_add(1);
    Ok(())
}

/// Unlist `agent` from the tile containing `p`.
pub fn remove(grid: &mut Grid, agent: AgentId, p: Vec2) -> MotionResult<()> {
    let (x, y) = p.tile();
    let tile = grid.tile_mut(x, y)?;
    let i = tile
        .occupants
        .iter()
        .position(|&a| a == agent)
        .ok_or(MotionError::NotOccupying { agent, x, y })?;
    tile.occupants.remove(i);
    Ok(())
}

/// Move `agent`'s listing from the tile of `from` to the tile of `to`.
/// Returns `true` if the tile changed.
pub fn relocate(grid: &mut Grid, agent: AgentId, from: Vec2, to: Vec2) -> MotionResult<bool> {
    if from.tile() == to.tile() {
        return Ok(false);
    }
    remove(grid, agent, from)?;
    place(grid, agent, to)?;
    Ok(true)
}

/// Agents listed in the `(2·reach + 1)²` tiles around `(x, y)`, skipping
/// tiles outside the grid.
pub fn neighbours(grid: &Grid, x: i64, y: i64, reach: i64) -> impl Iterator<Item = AgentId> + '_ {
    (y - reach..=y + reach).flat_map(move |ny| {
        (x - reach..=x + reach).flat_map(move |nx| {
            grid.tile(nx, ny)
                .map(|t| t.occupants.as_slice())
                .unwrap_or_default()
                .iter()
                .copied()
        })
    })
}
