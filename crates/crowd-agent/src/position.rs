//! Double-buffered agent positions.
//!
//! # Protocol
//!
//! Each position has two slots, A and B.  The clock's [`Parity`] names the
//! *committed* slot: the state as of the end of the previous tick.
//!
//! * [`Position::read_committed`] reads the committed slot.  Every reader
//!   during the parallel decision phase uses this, so all of them see the
//!   same snapshot.
//! * [`Position::write`] writes the other slot and records it as latest.
//! * [`Position::read_latest`] reads whichever slot was written last.  Only
//!   the single-threaded movement phase uses it.
//!
//! Flipping the parity ([`SimClock::advance`](crowd_core::SimClock::advance))
//! publishes all of a tick's writes at once.  Every live agent is written
//! exactly once per tick, so after the flip the new inactive slot is always
//! the one that is about to be overwritten.

use crowd_core::{AgentId, Parity, Vec2};

use crate::{AgentError, AgentResult};

// ── Position ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    a:      Vec2,
    b:      Vec2,
    latest: Parity,
}

impl Position {
    /// A fresh position with both slots equal, valid under either parity.
    pub fn new(p: Vec2) -> Self {
        Self { a: p, b: p, latest: Parity::A }
    }

    #[inline]
    fn slot(&self, which: Parity) -> Vec2 {
        match which {
            Parity::A => self.a,
            Parity::B => self.b,
        }
    }

    /// The state as of the end of the previous tick.
    #[inline]
    pub fn read_committed(&self, parity: Parity) -> Vec2 {
        self.slot(parity)
    }

    /// Write the inactive slot for this tick.
    #[inline]
    pub fn write(&mut self, parity: Parity, p: Vec2) {
        let target = parity.other();
        match target {
            Parity::A => self.a = p,
            Parity::B => self.b = p,
        }
        self.latest = target;
    }

    /// The most recently written slot.
    #[inline]
    pub fn read_latest(&self) -> Vec2 {
        self.slot(self.latest)
    }
}

// ── PositionStore ─────────────────────────────────────────────────────────────

/// Positions of every agent, indexed by `AgentId`.
///
/// Agent IDs are never reused, so a removed agent leaves a `None` hole.
#[derive(Default)]
pub struct PositionStore {
    slots: Vec<Option<Position>>,
    live:  usize,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent at `p` (both slots).
    pub fn insert(&mut self, agent: AgentId, p: Vec2) {
        let i = agent.index();
        if self.slots.len() <= i {
            self.slots.resize(i + 1, None);
        }
        if self.slots[i].replace(Position::new(p)).is_none() {
            self.live += 1;
        }
    }

    pub fn remove(&mut self, agent: AgentId) -> Option<Position> {
        let removed = self.slots.get_mut(agent.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> Option<&Position> {
        self.slots.get(agent.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn committed(&self, agent: AgentId, parity: Parity) -> AgentResult<Vec2> {
        self.get(agent)
            .map(|p| p.read_committed(parity))
            .ok_or(AgentError::UnknownAgent(agent))
    }

    #[inline]
    pub fn latest(&self, agent: AgentId) -> AgentResult<Vec2> {
        self.get(agent)
            .map(Position::read_latest)
            .ok_or(AgentError::UnknownAgent(agent))
    }

    pub fn write(&mut self, agent: AgentId, parity: Parity, p: Vec2) -> AgentResult<()> {
        let slot = self
            .slots
            .get_mut(agent.index())
            .and_then(Option::as_mut)
            .ok_or(AgentError::UnknownAgent(agent))?;
        slot.write(parity, p);
        Ok(())
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live agents in ascending ID order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| AgentId(i as u32))
    }
}
