//! `crowd-grid`: walkability grid, flow fields, and the flow-field codec.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`tile`]      | `Tile`, `Side`, `EdgeFlags`                                 |
//! | [`grid`]      | `Grid` (row-major tiles + owned `FlowFieldSet`), text maps  |
//! | [`mapcolor`]  | RGBA pixel → tile decoding for venue map images            |
//! | [`flowfield`] | distance + direction phases, `FlowFieldBuilder`, `FlowFieldSet` |
//! | [`codec`]     | HSV/sigmoid pixel encoding of persisted flow fields         |
//! | [`error`]     | `GridError`, `GridResult<T>`                                |
//!
//! # Coordinates
//!
//! Tile `(x, y)` covers `[x, x+1) × [y, y+1)` in venue space; `y` grows
//! downward, so north is `y - 1`.  All lookups take signed coordinates and
//! fail with [`GridError::OutOfBounds`] outside `[0, width) × [0, height)`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod codec;
pub mod error;
pub mod flowfield;
pub mod grid;
pub mod mapcolor;
pub mod tile;


pub use error::{GridError, GridResult};
pub use flowfield::{FlowField, FlowFieldBuilder, FlowFieldSet};
pub use grid::Grid;
pub use tile::{EdgeFlags, Side, Tile};
