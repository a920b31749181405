//! Venue map colour decoding.
//!
//! Image decoding itself is the caller's job; this module turns a decoded
//! RGBA8 buffer into tiles.  Opaque black is a wall, four reserved colours
//! mark walkable tiles with one blocked edge, anything else is floor.

use crate::tile::{Side, Tile};
use crate::{Grid, GridError, GridResult};

pub const WALL: [u8; 4] = [0, 0, 0, 255];
pub const BLOCKED_NORTH: [u8; 4] = [0, 0, 255, 255];
pub const BLOCKED_EAST: [u8; 4] = [255, 0, 255, 255];
pub const BLOCKED_SOUTH: [u8; 4] = [251, 0, 7, 255];
pub const BLOCKED_WEST: [u8; 4] = [120, 0, 120, 255];

/// Decode one RGBA pixel.
pub fn tile_from_pixel(px: [u8; 4]) -> Tile {
    match px {
        WALL => Tile::wall(),
        BLOCKED_NORTH => Tile::blocked(Side::North),
        BLOCKED_EAST => Tile::blocked(Side::East),
        BLOCKED_SOUTH => Tile::blocked(Side::South),
        BLOCKED_WEST => Tile::blocked(Side::West),
        _ => Tile::floor(),
    }
}

impl Grid {
    /// Build a grid from a row-major RGBA8 buffer of `width × height` pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: &[u8]) -> GridResult<Grid> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(GridError::PixelBuffer { expected, actual: pixels.len() });
        }
        let tiles: Vec<Tile> = pixels
            .chunks_exact(4)
            .map(|c| tile_from_pixel([c[0], c[1], c[2], c[3]]))
            .collect();
        let blocked = tiles.iter().filter(|t| !t.blocked.is_empty()).count();
        if blocked > 0 {
            log::debug!("map has {blocked} edge-blocked tiles");
        }
        Grid::from_tiles(width, height, tiles)
    }
}
