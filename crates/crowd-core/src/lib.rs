//! `crowd-core`: foundational types for the crowd movement engine.
//!
//! This crate is a dependency of every other `crowd-*` crate.  It has no
//! `crowd-*` dependencies and minimal external ones (`rand` and `rand_distr`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                   |
//! |-----------|------------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `DestinationId`, `RegionId`, `GroupId`          |
//! | [`geo`]   | `Vec2`, `Circle`, `GeoPoint`, angle helpers                |
//! | [`time`]  | `Tick`, `Parity`, `SimClock`, `SimConfig`                  |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global)                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{Circle, GeoPoint, Vec2, angle_between, wrap_angle};
pub use ids::{AgentId, DestinationId, GroupId, RegionId};
pub use rng::{AgentRng, SimRng};
pub use time::{Parity, SimClock, SimConfig, Tick};
