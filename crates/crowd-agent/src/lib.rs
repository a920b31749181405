//! `crowd-agent`: per-agent state for the crowd engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`position`]    | `Position` (A/B slots), `PositionStore` indexed by `AgentId` |
//! | [`destination`] | `Destination`, `EventWindow`, `DestinationSet` (with exit)  |
//! | [`preference`]  | time-windowed weights, `sample_destination`                 |
//! | [`individual`]  | `Individual`, `AgentState`, `DecideContext`                 |
//! | [`region`]      | monitored regions, `InsideSet`, `RegionTransition`          |
//! | [`config`]      | `BehaviorConfig`                                            |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                              |
//!
//! # Concurrency
//!
//! [`Individual::decide`] only reads shared state (grid, flow fields,
//! destinations, committed positions) and mutates the individual itself, so
//! many individuals can decide in parallel as long as each is borrowed
//! mutably by exactly one task.  Positions are written afterwards, by the
//! single-threaded movement phase.

pub mod config;
pub mod destination;
pub mod error;
pub mod individual;
pub mod position;
pub mod preference;
pub mod region;

#[cfg(test)]
mod tests;

pub use config::BehaviorConfig;
pub use destination::{Destination, DestinationSet, EventWindow};
pub use error::{AgentError, AgentResult};
pub use individual::{AgentState, DecideContext, Individual};
pub use position::{Position, PositionStore};
pub use preference::{Preference, Preferences, sample_destination};
pub use region::{InsideSet, Region, RegionMonitor, RegionTransition};
