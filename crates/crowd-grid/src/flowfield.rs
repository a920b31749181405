//! Flow-field construction.
//!
//! A flow field is built in two phases over the grid:
//!
//! 1. **Distance** ([`distance_field`]): multi-source Dijkstra from every
//!    walkable tile inside the destination's regions, over 4-connected
//!    moves of cost 1.  Walls never enter the queue; unreachable tiles keep
//!    `+∞`.
//! 2. **Direction** ([`derive_directions`]): for every walkable tile pick
//!    the neighbour (of up to 8) with the steepest descent per unit length.
//!    A diagonal is only a candidate when both orthogonal steps flanking it
//!    are legal, so no direction ever cuts a wall corner.
//!
//! # Tie-break
//!
//! Candidates are visited in the fixed order N, E, S, W, NE, SE, SW, NW and
//! only a strictly better score replaces the current best, so among equal
//! descents cardinals win over diagonals, then clockwise order from north.
//!
//! # Direction values
//!
//! Directions are `atan2(dy, dx)` angles in screen coordinates: east is 0,
//! south is `π/2`, north is `-π/2`.  `None` marks walls, unreachable tiles,
//! destination tiles (distance 0) and local minima.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::f64::consts::{FRAC_PI_4, SQRT_2};
use std::time::Instant;

use crowd_core::{Circle, DestinationId};

use crate::tile::Side;
use crate::{Grid, GridError, GridResult};

/// Neighbour probe order for the direction phase: `(dx, dy, sides)`.
/// Diagonals list the two orthogonal sides they pass between.
const CANDIDATES: [(i64, i64, &[Side]); 8] = [
    (0, -1, &[Side::North]),
    (1, 0, &[Side::East]),
    (0, 1, &[Side::South]),
    (-1, 0, &[Side::West]),
    (1, -1, &[Side::North, Side::East]),
    (1, 1, &[Side::South, Side::East]),
    (-1, 1, &[Side::South, Side::West]),
    (-1, -1, &[Side::North, Side::West]),
];

// ── FlowField ─────────────────────────────────────────────────────────────────

/// Distance and direction toward one destination, for every tile.
#[derive(Clone, Debug)]
pub struct FlowField {
    pub destination: DestinationId,
    width:     u32,
    height:    u32,
    distance:  Vec<f64>,
    direction: Vec<Option<f64>>,
}

impl FlowField {
    /// Assemble a field from row-major parts (e.g. a decoded image).
    pub fn from_parts(
        destination: DestinationId,
        width: u32,
        height: u32,
        distance: Vec<f64>,
        direction: Vec<Option<f64>>,
    ) -> GridResult<Self> {
        let expected = width as usize * height as usize;
        for actual in [distance.len(), direction.len()] {
            if actual != expected {
                return Err(GridError::PixelBuffer { expected, actual });
            }
        }
        Ok(FlowField { destination, width, height, distance, direction })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn idx(&self, x: i64, y: i64) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Shortest-path distance in grid steps; `+∞` if unreachable or off-grid.
    pub fn distance(&self, x: i64, y: i64) -> f64 {
        self.idx(x, y).map_or(f64::INFINITY, |i| self.distance[i])
    }

    pub fn direction(&self, x: i64, y: i64) -> Option<f64> {
        self.idx(x, y).and_then(|i| self.direction[i])
    }

    #[inline]
    pub fn distance_at(&self, index: usize) -> f64 {
        self.distance.get(index).copied().unwrap_or(f64::INFINITY)
    }

    #[inline]
    pub fn direction_at(&self, index: usize) -> Option<f64> {
        self.direction.get(index).copied().flatten()
    }

    pub fn distances(&self) -> &[f64] {
        &self.distance
    }

    pub fn directions(&self) -> &[Option<f64>] {
        &self.direction
    }

    /// Number of tiles with a finite distance.
    pub fn reachable_count(&self) -> usize {
        self.distance.iter().filter(|d| d.is_finite()).count()
    }

    /// Arrow rendering for debugging: `#` unreachable, `X` destination,
    /// `?` no descent, otherwise the nearest of 8 arrows.
    pub fn render_arrows(&self) -> String {
        const ARROWS: [char; 8] = ['→', '↘', '↓', '↙', '←', '↖', '↑', '↗'];
        let mut out = String::new();
        for (i, (&d, dir)) in self.distance.iter().zip(&self.direction).enumerate() {
            let ch = match dir {
                Some(theta) => {
                    let octant = (theta / FRAC_PI_4).round() as i64;
                    ARROWS[octant.rem_euclid(8) as usize]
                }
                None if d.is_infinite() => '#',
                None if d == 0.0 => 'X',
                None => '?',
            };
            out.push(ch);
            if (i + 1) % self.width as usize == 0 {
                out.push('\n');
            }
        }
        out
    }
}

// ── Distance phase ────────────────────────────────────────────────────────────

/// Walkable tiles inside any of `regions`, as row-major indices.
pub fn source_tiles(grid: &Grid, regions: &[Circle]) -> Vec<usize> {
    let mut sources = Vec::new();
    let mut seen = vec![false; grid.tile_count()];
    for region in regions {
        let (x0, y0, x1, y1) = region.tile_bounds();
        for y in y0.max(0)..=y1.min(grid.height() as i64 - 1) {
            for x in x0.max(0)..=x1.min(grid.width() as i64 - 1) {
                if !region.covers_tile(x, y) || !grid.is_open(x, y) {
                    continue;
                }
                if let Ok(i) = grid.index(x, y) {
                    if !seen[i] {
                        seen[i] = true;
                        sources.push(i);
                    }
                }
            }
        }
    }
    sources
}

/// Multi-source shortest-path distances (in steps) to the nearest tile
/// covered by `regions`.
///
/// The relaxation runs outward from the sources, so the edge from tile `c`
/// back to neighbour `n` is usable only if an agent standing on `n` could
/// step into `c` ([`Grid::can_leave`]).
pub fn distance_field(grid: &Grid, regions: &[Circle]) -> Vec<f64> {
    let n = grid.tile_count();
    let mut dist = vec![u32::MAX; n];

    // Min-heap: (steps, tile index).  Reverse turns BinaryHeap into a min-heap.
    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    for i in source_tiles(grid, regions) {
        dist[i] = 0;
        heap.push(Reverse((0, i)));
    }

    while let Some(Reverse((cost, i))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[i] {
            continue;
        }
        let (x, y) = grid.coords(i);
        for side in Side::ALL {
            let (dx, dy) = side.delta();
            let (nx, ny) = (x + dx, y + dy);
            if !grid.can_leave(nx, ny, side.opposite()) {
                continue;
            }
            let Ok(j) = grid.index(nx, ny) else { continue };
            let next = cost + 1;
            if next < dist[j] {
                dist[j] = next;
                heap.push(Reverse((next, j)));
            }
        }
    }

    dist.into_iter()
        .map(|d| if d == u32::MAX { f64::INFINITY } else { d as f64 })
        .collect()
}

// ── Direction phase ───────────────────────────────────────────────────────────

/// Steepest-descent direction for every tile, given a distance field.
pub fn derive_directions(grid: &Grid, distance: &[f64]) -> Vec<Option<f64>> {
    (0..grid.tile_count())
        .map(|i| direction_for_tile(grid, distance, i))
        .collect()
}

fn direction_for_tile(grid: &Grid, distance: &[f64], i: usize) -> Option<f64> {
    let here = distance[i];
    if !here.is_finite() || here == 0.0 {
        return None;
    }
    let (x, y) = grid.coords(i);
    if !grid.is_open(x, y) {
        return None;
    }

    let mut best: Option<(i64, i64)> = None;
    let mut best_score = 0.0;
    for (dx, dy, sides) in CANDIDATES {
        if !sides.iter().all(|&s| grid.can_leave(x, y, s)) {
            continue;
        }
        let Ok(j) = grid.index(x + dx, y + dy) else { continue };
        if sides.len() == 2 && !grid.is_open(x + dx, y + dy) {
            continue;
        }
        let step = if sides.len() == 2 { SQRT_2 } else { 1.0 };
        let score = (here - distance[j]) / step;
        if score > best_score {
            best_score = score;
            best = Some((dx, dy));
        }
    }
    best.map(|(dx, dy)| (dy as f64).atan2(dx as f64))
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Runs both phases for one destination against a read-only grid.
///
/// Building never mutates the grid, so several destinations can be built
/// concurrently and inserted afterwards.
pub struct FlowFieldBuilder<'g> {
    grid: &'g Grid,
}

impl<'g> FlowFieldBuilder<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    /// Build the complete field for `destination`, whose "inside" is the
    /// union of `regions`.  A destination no tile can reach yields an
    /// all-`∞` field rather than an error.
    pub fn build(&self, destination: DestinationId, regions: &[Circle]) -> FlowField {
        let started = Instant::now();
        let distance = distance_field(self.grid, regions);
        let direction = derive_directions(self.grid, &distance);
        let field = FlowField {
            destination,
            width: self.grid.width(),
            height: self.grid.height(),
            distance,
            direction,
        };
        let reachable = field.reachable_count();
        if reachable == 0 {
            log::warn!("flow field for {destination}: no tile can reach the destination");
        }
        log::info!(
            "flow field for {destination}: {reachable} reachable tiles in {:.1?}",
            started.elapsed()
        );
        field
    }
}

// ── FlowFieldSet ──────────────────────────────────────────────────────────────

/// Dense per-destination field table indexed by `DestinationId`.
#[derive(Debug, Default)]
pub struct FlowFieldSet {
    fields: Vec<Option<FlowField>>,
}

impl FlowFieldSet {
    /// Store a completed field, replacing any previous one for the same
    /// destination.
    pub fn insert(&mut self, field: FlowField) {
        let i = field.destination.index();
        if self.fields.len() <= i {
            self.fields.resize_with(i + 1, || None);
        }
        self.fields[i] = Some(field);
    }

    #[inline]
    pub fn get(&self, destination: DestinationId) -> Option<&FlowField> {
        self.fields.get(destination.index()).and_then(Option::as_ref)
    }

    pub fn contains(&self, destination: DestinationId) -> bool {
        self.get(destination).is_some()
    }

    pub fn remove(&mut self, destination: DestinationId) -> Option<FlowField> {
        self.fields.get_mut(destination.index()).and_then(Option::take)
    }

    /// Number of built fields.
    pub fn len(&self) -> usize {
        self.fields.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowField> + '_ {
        self.fields.iter().flatten()
    }
}
