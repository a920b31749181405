//! The per-agent state machine.
//!
//! ```text
//!            choose                       inside target
//! NoTarget ─────────▶ Travelling(target) ─────────────▶ Dwelling(target, leave_at)
//!    ▲                     │ target closed                  │ now ≥ leave_at
//!    └─────────────────────┴────────────────────────────────┘ or target closed
//! ```
//!
//! A dwelling agent whose dwell expires picks its next destination on the
//! same tick.

use crowd_core::{AgentId, AgentRng, DestinationId, GroupId, Parity, Vec2, angle_between};
use crowd_grid::Grid;

use crate::{AgentResult, BehaviorConfig, DestinationSet, InsideSet, PositionStore, Preferences};

// ── AgentState ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    NoTarget,
    Travelling(DestinationId),
    Dwelling {
        target:   DestinationId,
        /// Unix seconds.
        leave_at: i64,
    },
}

impl AgentState {
    pub fn target(self) -> Option<DestinationId> {
        match self {
            AgentState::NoTarget => None,
            AgentState::Travelling(t) | AgentState::Dwelling { target: t, .. } => Some(t),
        }
    }
}

// ── DecideContext ─────────────────────────────────────────────────────────────

/// Read-only view of the world shared by every decision in one tick.
pub struct DecideContext<'a> {
    /// Simulation time, Unix seconds.
    pub now:          i64,
    /// Committed position slot for this tick.
    pub parity:       Parity,
    pub grid:         &'a Grid,
    pub destinations: &'a DestinationSet,
    pub positions:    &'a PositionStore,
    pub config:       &'a BehaviorConfig,
}

// ── Individual ────────────────────────────────────────────────────────────────

pub struct Individual {
    pub id:          AgentId,
    pub group:       GroupId,
    pub state:       AgentState,
    pub preferences: Preferences,
    /// Heading held between ticks (radians).
    pub orientation: f64,
    /// Random offset added to `orientation`.
    pub sway:        f64,
    pub step_size:   f64,
    /// Distance covered by the last move.
    pub last_move:   f64,
    /// Regions the agent is currently inside.
    pub inside:      InsideSet,
    /// Whether this agent's region transitions are delivered.
    pub reports:     bool,
    pub rng:         AgentRng,
}

impl Individual {
    pub fn new(id: AgentId, group: GroupId, preferences: Preferences, step_size: f64, rng: AgentRng) -> Self {
        Self {
            id,
            group,
            state: AgentState::NoTarget,
            preferences,
            orientation: 0.0,
            sway: 0.0,
            step_size,
            last_move: 0.0,
            inside: InsideSet::default(),
            reports: true,
            rng,
        }
    }

    #[inline]
    pub fn target(&self) -> Option<DestinationId> {
        self.state.target()
    }

    /// Advance the state machine and return the heading this agent wants to
    /// move along, or `None` to stay put this tick.
    ///
    /// Reads only the committed position snapshot.
    pub fn decide(&mut self, ctx: &DecideContext<'_>) -> AgentResult<Option<f64>> {
        let pos = ctx.positions.committed(self.id, ctx.parity)?;
        let destinations = ctx.destinations;

        // A target that closed, or vanished, is dropped whatever the state.
        if let Some(target) = self.state.target() {
            if !destinations.get(target).is_some_and(|d| d.is_selectable()) {
                log::debug!("{}: target {} no longer selectable", self.id, target);
                self.state = AgentState::NoTarget;
            }
        }

        if let AgentState::Dwelling { leave_at, .. } = self.state {
            if ctx.now >= leave_at {
                self.state = AgentState::NoTarget;
            }
        }

        if self.state == AgentState::NoTarget {
            match self.preferences.choose(ctx.now, destinations, &mut self.rng) {
                Some(next) => self.state = AgentState::Travelling(next),
                None => return Ok(None),
            }
        }

        let AgentState::Travelling(target) = self.state else {
            return Ok(None);
        };
        let Some(destination) = destinations.get(target) else {
            return Ok(None);
        };

        if destination.contains(pos) {
            let leave_at = destination.leave_time(ctx.now, &mut self.rng);
            self.state = AgentState::Dwelling { target, leave_at };
            return Ok(None);
        }

        let (tx, ty) = pos.tile();
        let suggested = match ctx.grid.direction(target, tx, ty) {
            Some(theta) => theta,
            None => match destination.nearest_center(pos) {
                Some(centre) => pos.angle_to(centre),
                None => return Ok(None),
            },
        };
        Ok(Some(self.steer(suggested, ctx.config)))
    }

    /// Blend the suggested heading with sway, keeping the held orientation
    /// unless it diverges past the threshold or the agent is stalled.
    fn steer(&mut self, suggested: f64, config: &BehaviorConfig) -> f64 {
        let stalled = self.last_move < config.stall_distance;
        let mut sway = (self.rng.unit() - 0.5) * 2.0 * config.max_sway;
        if stalled {
            sway *= config.stall_sway_multiplier;
        }
        if stalled || angle_between(self.orientation, suggested) >= config.orientation_threshold {
            self.orientation = suggested;
            self.sway = sway;
        }
        self.orientation + self.sway
    }

    /// Current committed position.  Convenience for tests and diagnostics.
    pub fn position(&self, positions: &PositionStore, parity: Parity) -> AgentResult<Vec2> {
        positions.committed(self.id, parity)
    }
}
