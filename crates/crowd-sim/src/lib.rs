//! `crowd-sim`: the tick controller.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Pause gate: block here (never mid-tick) while paused.
//!   ② Admission: up to `spawn_per_tick` spawn attempts at the entrances.
//!   ③ Fan-out: one task per group; every member decides a heading
//!      against the committed positions (parallel with the `parallel`
//!      feature).
//!   ④ Fan-in: moves are applied one at a time in ascending AgentId
//!      order. Each is resolved, written, and reflected in occupancy;
//!      region transitions are detected and agents at the exit removed.
//!   ⑤ Flip: `SimClock::advance` publishes the tick's writes.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Group fan-out and flow-field builds on Rayon (default).  |
//! | `fx-hash`  | FxHash for the agent → group map.                        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use crowd_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config, grid, destinations)
//!     .entrances(entrances)
//!     .population(500, 8)
//!     .build()?;
//! sim.generate_flow_fields();
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod group;
pub mod observer;
pub mod pause;
pub mod sim;
pub mod spawn;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use group::{Group, MoveRequest, plan_all};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use pause::PauseControl;
pub use sim::Sim;
pub use spawn::{SPAWN_ATTEMPTS, try_spawn};
