//! `crowd-motion`: turns a desired heading into a collision-safe move.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`config`]    | `MotionConfig` (agent radius, default step)              |
//! | [`resolver`]  | `MovementResolver`: wall clip, agent clip, commit        |
//! | [`occupancy`] | tile occupant lists and hit counts                       |
//! | [`error`]     | `MotionError`, `MotionResult<T>`                         |
//!
//! # Threading
//!
//! Everything here runs on the tick controller thread after the group
//! fan-in.  Tile occupancy is mutated without locks because nothing else
//! touches it while moves are applied.

pub mod config;
pub mod error;
pub mod occupancy;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use config::MotionConfig;
pub use error::{MotionError, MotionResult};
pub use resolver::{Movement, MovementResolver};
