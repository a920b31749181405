//! Simulation observer trait for progress reporting and data collection.

use crowd_agent::{PositionStore, RegionTransition};
use crowd_core::{Parity, Tick};

/// Per-tick counters handed to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick:        Tick,
    /// Simulated time at the start of the tick, Unix seconds.
    pub unix_secs:   i64,
    /// Agents in the venue after the tick.
    pub live:        usize,
    pub spawned:     usize,
    /// Agents removed at the exit.
    pub exited:      usize,
    /// Agents that covered a non-zero distance.
    pub moved:       usize,
    pub transitions: usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: region transition forwarder
///
/// ```rust,ignore
/// struct Forward<S: TransitionSink>(S);
///
/// impl<S: TransitionSink> SimObserver for Forward<S> {
///     fn on_transitions(&mut self, _tick: Tick, t: &[RegionTransition]) {
///         for transition in t {
///             self.0.send(transition);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before admission.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Region enter/exit events produced during the tick, in the order they
    /// occurred.  Not called for ticks without transitions.
    fn on_transitions(&mut self, _tick: Tick, _transitions: &[RegionTransition]) {}

    /// Called at the end of each tick, after the buffer flip.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with the positions just committed.
    fn on_snapshot(&mut self, _tick: Tick, _positions: &PositionStore, _parity: Parity) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
