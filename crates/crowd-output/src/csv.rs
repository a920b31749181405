//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `transitions.csv`
//! - `tick_summaries.csv`
//! - `agent_positions.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::sink::TransitionSink;
use crate::{OutputResult, PositionRow, TickSummaryRow, TransitionRecord};

/// Writes transitions, tick summaries and position snapshots to CSV.
pub struct CsvTransitionWriter {
    transitions: Writer<File>,
    summaries:   Writer<File>,
    positions:   Writer<File>,
    finished:    bool,
}

impl CsvTransitionWriter {
    /// Create the CSV files in `dir` and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut transitions = Writer::from_path(dir.join("transitions.csv"))?;
        transitions.write_record(["uuid", "event_id", "region_id", "entering", "occurred_at"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "unix_time_secs", "live", "spawned", "exited", "moved", "transitions"])?;

        let mut positions = Writer::from_path(dir.join("agent_positions.csv"))?;
        positions.write_record(["agent_id", "tick", "x", "y"])?;

        Ok(Self {
            transitions,
            summaries,
            positions,
            finished: false,
        })
    }
}

impl TransitionSink for CsvTransitionWriter {
    fn record(&mut self, records: &[TransitionRecord]) -> OutputResult<()> {
        for r in records {
            self.transitions.write_record(&[
                r.uuid.clone(),
                r.event_id.to_string(),
                r.region_id.to_string(),
                (r.entering as u8).to_string(),
                r.occurred_at.to_string(),
            ])?;
        }
        Ok(())
    }

    fn record_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.live.to_string(),
            row.spawned.to_string(),
            row.exited.to_string(),
            row.moved.to_string(),
            row.transitions.to_string(),
        ])?;
        Ok(())
    }

    fn record_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()> {
        for row in rows {
            self.positions.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                format!("{:.4}", row.x),
                format!("{:.4}", row.y),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.transitions.flush()?;
        self.summaries.flush()?;
        self.positions.flush()?;
        Ok(())
    }
}
