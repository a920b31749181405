//! The `TransitionSink` trait implemented by every reporting backend.

use crate::{OutputResult, PositionRow, TickSummaryRow, TransitionRecord};

/// Receives what the tick loop reports.
///
/// Only transitions are mandatory; summaries and position snapshots default
/// to being ignored.  Errors are stored by
/// [`SimOutputObserver`][crate::SimOutputObserver] rather than stopping the
/// run.
pub trait TransitionSink {
    /// Record the transitions emitted during one tick.
    fn record(&mut self, transitions: &[TransitionRecord]) -> OutputResult<()>;

    fn record_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
        Ok(())
    }

    fn record_positions(&mut self, _rows: &[PositionRow]) -> OutputResult<()> {
        Ok(())
    }

    /// Flush everything still buffered.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Discards everything.  Used for load testing the engine without a
/// backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidSink;

impl TransitionSink for VoidSink {
    fn record(&mut self, _transitions: &[TransitionRecord]) -> OutputResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
