//! Plain data records written by the sinks.

use serde::Serialize;

use crowd_agent::RegionTransition;
use crowd_sim::TickSummary;

/// One occupancy transition as the analytics backend expects it.
///
/// Serialises to `{"uuid", "eventId", "regionId", "entering", "occurredAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    /// `SimBot-` followed by the zero-padded agent ID.
    pub uuid:        String,
    pub event_id:    i32,
    pub region_id:   i32,
    pub entering:    bool,
    /// Unix seconds.
    pub occurred_at: i64,
}

impl From<&RegionTransition> for TransitionRecord {
    fn from(t: &RegionTransition) -> Self {
        Self {
            uuid:        t.agent.report_uuid(),
            event_id:    t.event_id,
            region_id:   t.region_id,
            entering:    t.entering,
            occurred_at: t.occurred_at,
        }
    }
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:           u64,
    pub unix_time_secs: i64,
    pub live:           u64,
    pub spawned:        u64,
    pub exited:         u64,
    pub moved:          u64,
    pub transitions:    u64,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:           s.tick.0,
            unix_time_secs: s.unix_secs,
            live:           s.live as u64,
            spawned:        s.spawned as u64,
            exited:         s.exited as u64,
            moved:          s.moved as u64,
            transitions:    s.transitions as u64,
        }
    }
}

/// One agent's committed position at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub x:        f64,
    pub y:        f64,
}
