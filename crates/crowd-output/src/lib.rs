//! `crowd-output`: where the engine's occupancy transitions go.
//!
//! | Sink                    | Destination                                              |
//! |-------------------------|----------------------------------------------------------|
//! | [`VoidSink`]            | nowhere (load testing)                                   |
//! | [`CsvTransitionWriter`] | `transitions.csv`, `tick_summaries.csv`, `agent_positions.csv` |
//! | [`BatchingReporter`]    | JSON batches handed to a [`BatchDelivery`] on a worker thread |
//!
//! All sinks implement [`TransitionSink`] and are driven by
//! [`SimOutputObserver`], which implements `crowd_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crowd_output::{CsvTransitionWriter, SimOutputObserver};
//!
//! let writer = CsvTransitionWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod batch;
pub mod csv;
pub mod error;
pub mod observer;
pub mod record;
pub mod sink;


pub use batch::{BatchDelivery, BatchingReporter, MIN_BATCH, QUEUE_CAPACITY};
pub use crate::csv::CsvTransitionWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use record::{PositionRow, TickSummaryRow, TransitionRecord};
pub use sink::{TransitionSink, VoidSink};
