//! Per-cell state.

use crowd_core::AgentId;

// ── Side ──────────────────────────────────────────────────────────────────────

/// One of the four edges of a tile.  North is `y - 1`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Tile offset of the neighbour across this edge.
    #[inline]
    pub fn delta(self) -> (i64, i64) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        match self {
            Side::North => 0b0001,
            Side::East => 0b0010,
            Side::South => 0b0100,
            Side::West => 0b1000,
        }
    }
}

// ── EdgeFlags ─────────────────────────────────────────────────────────────────

/// Set of tile edges that may not be crossed when leaving the tile.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeFlags(u8);

impl EdgeFlags {
    pub const NONE: EdgeFlags = EdgeFlags(0);

    #[inline]
    pub fn only(side: Side) -> Self {
        EdgeFlags(side.bit())
    }

    #[inline]
    pub fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, side: Side) {
        self.0 |= side.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// ── Tile ──────────────────────────────────────────────────────────────────────

/// One grid cell.
///
/// Per-destination distance and direction caches do not live here; they are
/// held densely by the grid's [`FlowFieldSet`](crate::FlowFieldSet).
#[derive(Clone, Debug, Default)]
pub struct Tile {
    pub walkable: bool,
    /// Edges this tile may not be left through.
    pub blocked: EdgeFlags,
    /// Agents whose centre currently lies in this tile, in arrival order.
    pub occupants: Vec<AgentId>,
    /// Number of times an agent has entered this tile.
    pub hits: u32,
}

impl Tile {
    pub fn floor() -> Self {
        Tile { walkable: true, ..Tile::default() }
    }

    pub fn wall() -> Self {
        Tile { walkable: false, ..Tile::default() }
    }

    /// A walkable tile with one blocked edge.
    pub fn blocked(side: Side) -> Self {
        Tile {
            walkable: true,
            blocked: EdgeFlags::only(side),
            ..Tile::default()
        }
    }
}
