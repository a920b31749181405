//! `crowd-scenario`: loading venues from JSON documents.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`document`] | serde mirror of the scenario and geofence file formats         |
//! | [`region`]   | geofence loading and lat/lng projection                        |
//! | [`loader`]   | `Scenario`: grid, destinations (exit appended), regions, crowd |
//! | [`error`]    | `ScenarioError`, `ScenarioResult<T>`                           |
//!
//! Map images are decoded outside this crate.  [`Scenario::load`] accepts
//! text maps directly; for an image map decode it to RGBA, build the grid
//! with [`Grid::from_rgba`](crowd_grid::Grid::from_rgba) and call
//! [`Scenario::from_document`].

pub mod document;
pub mod error;
pub mod loader;
pub mod region;


pub use document::{CoordDoc, DestinationDoc, EventDoc, RegionDoc, ScenarioDoc, parse_time};
pub use error::{ScenarioError, ScenarioResult};
pub use loader::Scenario;
pub use region::{load_regions, load_regions_reader, project_regions};
