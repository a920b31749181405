//! `SimOutputObserver<S>` bridges `SimObserver` to a `TransitionSink`.

use crowd_agent::{PositionStore, RegionTransition};
use crowd_core::{Parity, Tick};
use crowd_sim::{SimObserver, TickSummary};

use crate::sink::TransitionSink;
use crate::{OutputError, OutputResult, PositionRow, TickSummaryRow, TransitionRecord};

/// A [`SimObserver`] that forwards transitions, tick summaries and position
/// snapshots to any [`TransitionSink`].
///
/// Sink errors are stored because `SimObserver` methods have no return
/// value.  After `sim.run()` returns, check with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<S: TransitionSink> {
    sink:       S,
    last_error: Option<OutputError>,
}

impl<S: TransitionSink> SimOutputObserver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last_error: None }
    }

    /// Take the stored sink error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::warn!("output sink error: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<S: TransitionSink> SimObserver for SimOutputObserver<S> {
    fn on_transitions(&mut self, _tick: Tick, transitions: &[RegionTransition]) {
        let records: Vec<TransitionRecord> = transitions.iter().map(TransitionRecord::from).collect();
        let result = self.sink.record(&records);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        let result = self.sink.record_summary(&TickSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, positions: &PositionStore, parity: Parity) {
        let rows: Vec<PositionRow> = positions
            .agent_ids()
            .filter_map(|agent| {
                let p = positions.committed(agent, parity).ok()?;
                Some(PositionRow { agent_id: agent.0, tick: tick.0, x: p.x, y: p.y })
            })
            .collect();

        if !rows.is_empty() {
            let result = self.sink.record_positions(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.sink.finish();
        self.store_err(result);
    }
}
