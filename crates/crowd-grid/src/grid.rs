//! The venue walkability grid.
//!
//! # Data layout
//!
//! Tiles are stored row-major: tile `(x, y)` lives at `y * width + x`.  Flow
//! fields use the same indexing, so a tile index computed once can be used
//! against every per-destination field.
//!
//! # Text maps
//!
//! [`Grid::parse`] reads a compact ASCII form used by tests and demos:
//!
//! | Char | Tile                      |
//! |------|---------------------------|
//! | `#`  | wall                      |
//! | `.`  | floor                     |
//! | `^`  | floor, blocked north edge |
//! | `>`  | floor, blocked east edge  |
//! | `v`  | floor, blocked south edge |
//! | `<`  | floor, blocked west edge  |

use crowd_core::{DestinationId, Vec2};

use crate::flowfield::{FlowField, FlowFieldSet};
use crate::tile::{Side, Tile};
use crate::{GridError, GridResult};

/// Fixed-size 2-D tile array plus the flow fields computed over it.
#[derive(Debug)]
pub struct Grid {
    width:  u32,
    height: u32,
    tiles:  Vec<Tile>,

    /// Per-destination flow fields.  A field is present only once fully
    /// built.
    pub flow_fields: FlowFieldSet,
}

impl Grid {
    /// An all-floor grid.
    pub fn new(width: u32, height: u32) -> GridResult<Self> {
        let tiles = vec![Tile::floor(); width as usize * height as usize];
        Self::from_tiles(width, height, tiles)
    }

    /// Build from a row-major tile vector.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> GridResult<Self> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(GridError::PixelBuffer { expected, actual: tiles.len() });
        }
        Ok(Grid { width, height, tiles, flow_fields: FlowFieldSet::default() })
    }

    /// Parse the ASCII map form (see module docs).  Blank lines are skipped;
    /// every remaining row must have the same width.
    pub fn parse(text: &str) -> GridResult<Self> {
        let mut tiles = Vec::new();
        let mut width: Option<usize> = None;
        let mut height = 0u32;

        for (row, line) in text.lines().map(str::trim_end).enumerate() {
            if line.is_empty() {
                continue;
            }
            let before = tiles.len();
            for ch in line.chars() {
                let tile = match ch {
                    '#' => Tile::wall(),
                    '.' => Tile::floor(),
                    '^' => Tile::blocked(Side::North),
                    '>' => Tile::blocked(Side::East),
                    'v' => Tile::blocked(Side::South),
                    '<' => Tile::blocked(Side::West),
                    other => {
                        return Err(GridError::Parse {
                            row,
                            message: format!("unknown map character {other:?}"),
                        });
                    }
                };
                tiles.push(tile);
            }
            let row_width = tiles.len() - before;
            match width {
                None => width = Some(row_width),
                Some(w) if w != row_width => {
                    return Err(GridError::Parse {
                        row,
                        message: format!("row has {row_width} tiles, expected {w}"),
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        Self::from_tiles(width.unwrap_or(0) as u32, height, tiles)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Row-major index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: i64, y: i64) -> GridResult<usize> {
        if self.in_bounds(x, y) {
            Ok(y as usize * self.width as usize + x as usize)
        } else {
            Err(GridError::OutOfBounds { x, y })
        }
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coords(&self, index: usize) -> (i64, i64) {
        let w = self.width as usize;
        ((index % w) as i64, (index / w) as i64)
    }

    // ── Tile access ───────────────────────────────────────────────────────

    pub fn tile(&self, x: i64, y: i64) -> GridResult<&Tile> {
        let i = self.index(x, y)?;
        Ok(&self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i64, y: i64) -> GridResult<&mut Tile> {
        let i = self.index(x, y)?;
        Ok(&mut self.tiles[i])
    }

    /// Tile containing a continuous point.
    pub fn tile_at(&self, p: Vec2) -> GridResult<&Tile> {
        let (x, y) = p.tile();
        self.tile(x, y)
    }

    pub fn is_walkable(&self, x: i64, y: i64) -> GridResult<bool> {
        Ok(self.tile(x, y)?.walkable)
    }

    /// In bounds and walkable.  Neighbour probes use this so that the map
    /// border behaves like a wall.
    #[inline]
    pub fn is_open(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_ok_and(|i| self.tiles[i].walkable)
    }

    /// `true` if an agent may step from `(x, y)` across `side` into the
    /// neighbouring tile.
    pub fn can_leave(&self, x: i64, y: i64, side: Side) -> bool {
        let Ok(i) = self.index(x, y) else {
            return false;
        };
        let tile = &self.tiles[i];
        if !tile.walkable || tile.blocked.contains(side) {
            return false;
        }
        let (dx, dy) = side.delta();
        self.is_open(x + dx, y + dy)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.walkable).count()
    }

    // ── Editing ───────────────────────────────────────────────────────────

    pub fn set_wall(&mut self, x: i64, y: i64) -> GridResult<()> {
        let tile = self.tile_mut(x, y)?;
        tile.walkable = false;
        Ok(())
    }

    pub fn block_edge(&mut self, x: i64, y: i64, side: Side) -> GridResult<()> {
        self.tile_mut(x, y)?.blocked.insert(side);
        Ok(())
    }

    // ── Flow fields ───────────────────────────────────────────────────────

    #[inline]
    pub fn flow_field(&self, destination: DestinationId) -> Option<&FlowField> {
        self.flow_fields.get(destination)
    }

    /// Cached direction at `(x, y)` toward `destination`.  `None` when no
    /// field is built, the tile is out of range, or no descent exists.
    pub fn direction(&self, destination: DestinationId, x: i64, y: i64) -> Option<f64> {
        let i = self.index(x, y).ok()?;
        self.flow_fields.get(destination)?.direction_at(i)
    }

    /// ASCII rendering in the [`parse`](Self::parse) format.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for (i, tile) in self.tiles.iter().enumerate() {
            let ch = if !tile.walkable {
                '#'
            } else if tile.blocked.contains(Side::North) {
                '^'
            } else if tile.blocked.contains(Side::East) {
                '>'
            } else if tile.blocked.contains(Side::South) {
                'v'
            } else if tile.blocked.contains(Side::West) {
                '<'
            } else {
                '.'
            };
            out.push(ch);
            if (i + 1) % self.width as usize == 0 {
                out.push('\n');
            }
        }
        out
    }
}
